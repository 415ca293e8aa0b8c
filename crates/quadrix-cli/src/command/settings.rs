use std::path::PathBuf;

use quadrix_engine::GameSettings;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SettingsArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SettingsArg) -> anyhow::Result<()> {
    let SettingsArg { output } = arg;
    Output::save_json(&GameSettings::default(), output.clone())?;
    if let Some(path) = output {
        eprintln!("Settings saved to {}", path.display());
    }
    Ok(())
}
