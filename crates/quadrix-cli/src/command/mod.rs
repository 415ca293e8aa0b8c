use clap::{Parser, Subcommand};

use self::{settings::SettingsArg, simulate::SimulateArg};

mod settings;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a game headless in fixed time steps and report the result
    Simulate(#[clap(flatten)] SimulateArg),
    /// Write the default game settings as JSON
    Settings(#[clap(flatten)] SettingsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Settings(arg) => settings::run(&arg)?,
    }
    Ok(())
}
