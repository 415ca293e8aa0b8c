use serde::{Deserialize, Serialize};

/// Timing and progression constants of a game.
///
/// All durations are in seconds. Missing fields fall back to their defaults
/// when deserializing, so a settings file only needs the values it changes.
///
/// # Example
///
/// ```
/// use quadrix_engine::GameSettings;
///
/// let settings: GameSettings = serde_json::from_str(r#"{ "lock_down_moves_limit": 5 }"#).unwrap();
/// assert_eq!(settings.lock_down_moves_limit, 5);
/// assert_eq!(settings.line_clear_pause, GameSettings::default().line_clear_pause);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Interval between auto-repeated horizontal moves.
    pub move_repeat_interval: f64,
    /// Hold time before horizontal auto-repeat starts.
    pub move_repeat_delay: f64,
    /// Gravity multiplier while soft drop is held.
    pub soft_drop_speed_factor: f64,
    /// Time a grounded piece may rest before it locks.
    pub lock_down_time_limit: f64,
    /// Successful moves a grounded piece may make before it locks.
    pub lock_down_moves_limit: usize,
    /// Pause between a line-clearing lock and the next spawn.
    pub line_clear_pause: f64,
    pub lines_per_level: usize,
    pub max_level: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            move_repeat_interval: 0.05,
            move_repeat_delay: 0.15,
            soft_drop_speed_factor: 20.0,
            lock_down_time_limit: 0.4,
            lock_down_moves_limit: 15,
            line_clear_pause: 0.3,
            lines_per_level: 10,
            max_level: 15,
        }
    }
}

/// Seconds a piece takes to fall one row at `level` without soft drop.
///
/// Level 1 is one row per second; each level speeds gravity up.
#[must_use]
pub fn seconds_per_line(level: usize) -> f64 {
    let steps = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    (0.8 - f64::from(steps) * 0.007).powi(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_per_line() {
        assert!((seconds_per_line(1) - 1.0).abs() < 1e-12);
        assert!((seconds_per_line(2) - 0.793).abs() < 1e-12);
        assert!((seconds_per_line(3) - 0.786 * 0.786).abs() < 1e-12);
        for level in 1..15 {
            assert!(seconds_per_line(level + 1) < seconds_per_line(level));
        }
    }

    #[test]
    fn test_level_zero_treated_as_one() {
        assert!((seconds_per_line(0) - seconds_per_line(1)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_round_trip_keeps_defaults() {
        let json = serde_json::to_string_pretty(&GameSettings::default()).unwrap();
        let settings: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn test_partial_json() {
        let settings: GameSettings =
            serde_json::from_str(r#"{ "move_repeat_delay": 0.2, "max_level": 20 }"#).unwrap();
        assert!((settings.move_repeat_delay - 0.2).abs() < f64::EPSILON);
        assert_eq!(settings.max_level, 20);
        assert_eq!(settings.lines_per_level, 10);
    }
}
