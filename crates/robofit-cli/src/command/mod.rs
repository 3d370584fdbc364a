use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, generate_trace::GenerateTraceArg, inspect::InspectArg};

mod evaluate;
mod generate_trace;
mod inspect;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Replay recorded runs and report their fitness
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Synthesize a lap run for smoke-testing fitness parameters
    GenerateTrace(#[clap(flatten)] GenerateTraceArg),
    /// Show the aggregated sensors and score breakdown of one step
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::GenerateTrace(arg) => generate_trace::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
