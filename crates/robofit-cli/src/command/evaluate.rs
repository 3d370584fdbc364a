use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use log::info;
use robofit_evaluator::run_evaluator::{DefaultRunEvaluator, RunEvaluator as _, RunSummary};

use crate::{
    schema::report::{FitnessReport, RunReport},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Recorded run files (JSON)
    #[arg(long = "trace", required = true, num_args = 1..)]
    traces: Vec<PathBuf>,
    /// Fitness parameter overrides (JSON)
    #[arg(long)]
    params: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        traces: trace_paths,
        params,
        output,
    } = arg;
    let params = util::read_params_file(params.as_deref())?;
    let evaluator = DefaultRunEvaluator::new(params.clone());

    let traces = trace_paths
        .iter()
        .map(util::read_trace_file)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let RunSummary {
        outcomes,
        mean_fitness,
    } = evaluator
        .evaluate_runs(&traces)
        .context("Failed to evaluate traces")?;

    let runs = trace_paths
        .iter()
        .zip(outcomes)
        .map(|(path, outcome)| {
            info!("{}: fitness {}", path.display(), outcome.breakdown);
            RunReport::new(path.clone(), outcome)
        })
        .collect::<Vec<_>>();
    info!("Mean fitness over {} runs: {mean_fitness:.4}", runs.len());

    let report = FitnessReport {
        evaluated_at: Utc::now(),
        params,
        runs,
        mean_fitness,
    };
    Output::save_json(&report, output.clone())?;
    if let Some(path) = output {
        info!("Report saved to {}", path.display());
    }

    Ok(())
}
