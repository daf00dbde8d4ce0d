//! Trial orchestration
//!
//! Runs a [`Selector`] independently `num_trials` times over one shared pool.
//! Each trial owns its partition state and its own `StdRng` seeded with
//! `seed + trial`, so results are reproducible no matter how trials are spread
//! across worker threads. Every trial starts from the configured `eps`.

use crate::{CancellationToken, ComparisonMatrix, Selector};
use fiesta_core::{Error, PartyEmbedding, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a batch of trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Parties to select per trial
    pub count: usize,
    pub num_trials: usize,
    /// Starting distance threshold for every trial
    pub eps: f32,
    pub selector: Selector,
    /// Build a pairwise distance matrix per trial
    pub build_matrix: bool,
    /// Base seed; trial `t` uses `seed + t`
    pub seed: u64,
    /// Worker threads, 0 for the rayon default
    pub workers: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            count: 10,
            num_trials: 1,
            eps: 1.0,
            selector: Selector::Diversity,
            build_matrix: false,
            seed: 0,
            workers: 0,
        }
    }
}

impl TrialConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_matrix(mut self, build_matrix: bool) -> Self {
        self.build_matrix = build_matrix;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Outcome of one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    /// Selected party keys in pick order
    pub keys: Vec<String>,
    pub final_eps: f32,
    pub relaxation_rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<ComparisonMatrix>,
}

/// Run a single trial
pub fn run_trial(
    pool: &[PartyEmbedding],
    trial: usize,
    config: &TrialConfig,
    cancel: &CancellationToken,
) -> Result<TrialResult> {
    cancel.check()?;
    debug!(trial, "starting trial");

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(trial as u64));
    let selection =
        config
            .selector
            .select_cancellable(pool, config.count, config.eps, &mut rng, cancel)?;

    let matrix = config
        .build_matrix
        .then(|| ComparisonMatrix::from_entries(&selection.entries));

    info!(
        trial,
        selected = selection.len(),
        final_eps = selection.final_eps,
        relaxation_rounds = selection.relaxation_rounds,
        "trial complete"
    );

    Ok(TrialResult {
        trial,
        keys: selection.keys(),
        final_eps: selection.final_eps,
        relaxation_rounds: selection.relaxation_rounds,
        matrix,
    })
}

/// Run `config.num_trials` independent trials
///
/// Trials cancelled through `cancel` are dropped; every trial that completed
/// is returned, ordered by trial index. Any other error aborts the batch.
pub fn run_trials(
    pool: &[PartyEmbedding],
    config: &TrialConfig,
    cancel: &CancellationToken,
) -> Result<Vec<TrialResult>> {
    let run = || -> Vec<Result<TrialResult>> {
        (0..config.num_trials)
            .into_par_iter()
            .map(|trial| run_trial(pool, trial, config, cancel))
            .collect()
    };

    let outcomes = if config.workers > 0 {
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("fiesta-trial-{}", i))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build worker pool: {}", e)))?;
        workers.install(run)
    } else {
        run()
    };

    collect_completed(outcomes)
}

/// Keep completed trials in order, drop cancelled ones, fail on anything else
fn collect_completed(outcomes: Vec<Result<TrialResult>>) -> Result<Vec<TrialResult>> {
    let mut results = Vec::with_capacity(outcomes.len());
    let mut cancelled = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(Error::Cancelled) => cancelled += 1,
            Err(e) => return Err(e),
        }
    }

    if cancelled > 0 {
        warn!(
            cancelled,
            completed = results.len(),
            "trials cancelled, returning completed trials"
        );
    }
    Ok(results)
}
