use std::path::PathBuf;

use chrono::{DateTime, Utc};
use robofit_evaluator::{
    accumulator::{FitnessBreakdown, ScorerState},
    params::FitnessParams,
    run_evaluator::RunOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FitnessReport {
    pub evaluated_at: DateTime<Utc>,
    pub params: FitnessParams,
    pub runs: Vec<RunReport>,
    pub mean_fitness: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    pub trace: PathBuf,
    pub state: ScorerState,
    pub external_collisions: u32,
    pub breakdown: FitnessBreakdown,
}

impl RunReport {
    pub fn new(trace: PathBuf, outcome: RunOutcome) -> Self {
        let RunOutcome {
            state,
            external_collisions,
            breakdown,
        } = outcome;
        Self {
            trace,
            state,
            external_collisions,
            breakdown,
        }
    }
}
