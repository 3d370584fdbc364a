use std::path::PathBuf;

use anyhow::Context;
use robofit_evaluator::{
    accumulator::{FitnessAccumulator, ScorerState, StepEvaluation},
    robot::{TrackedRobot as _, select_tracked_robot},
    run_evaluator::ReplayedRobot,
};
use robofit_sensor::{AggregatedFrame, aggregate};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Recorded run file (JSON)
    #[arg(long)]
    trace: PathBuf,
    /// Zero-based index of the step to inspect
    #[arg(long, default_value_t = 0)]
    step: usize,
    /// Fitness parameter overrides (JSON)
    #[arg(long)]
    params: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StepInspection {
    step: usize,
    frame: AggregatedFrame,
    evaluation: StepEvaluation,
    state_after: ScorerState,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let InspectArg {
        trace,
        step,
        params,
    } = arg;
    let params = util::read_params_file(params.as_deref())?;
    let run = util::read_trace_file(trace)?;
    let robot = select_tracked_robot(&run.robots)?;
    anyhow::ensure!(
        *step < robot.steps.len(),
        "step {step} out of range, trace has {} steps",
        robot.steps.len()
    );

    // earlier steps drive the lap detector and counters
    let mut accumulator = FitnessAccumulator::new(params);
    let mut inspection = None;
    for (index, recorded) in robot.steps.iter().enumerate().take(step + 1) {
        let replayed = ReplayedRobot::new(recorded, robot.max_wheel_speed);
        let frame = aggregate(replayed.sensor_readings());
        let evaluation = accumulator
            .step(&frame, replayed.wheel_speeds())
            .with_context(|| format!("Failed to score step {index}"))?;
        inspection = Some((frame, evaluation));
    }
    let (frame, evaluation) = inspection.context("no step was scored")?;

    let inspection = StepInspection {
        step: *step,
        frame,
        evaluation,
        state_after: accumulator.state().clone(),
    };
    Output::stdout().write_json(&inspection)
}
