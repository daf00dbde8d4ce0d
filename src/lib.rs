//! # fiesta
//!
//! Party embeddings and diversity-driven party selection for Four Job Fiesta
//! style runs.
//!
//! A run hands each of four characters a job, unlocked crystal by crystal.
//! fiesta turns every legal party into a vector that captures which styles
//! and equipment the party can use at each crystal and which jobs it holds,
//! then picks sets of parties that are far apart from each other.
//!
//! ## Quick Start
//!
//! ```bash
//! fiesta embed --catalog jobs.csv --variant Regular --out parties.csv
//! fiesta select --embeddings parties.csv --count 10 --trials 5 --eps 1.0 --matrix
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use fiesta::prelude::*;
//!
//! let catalog = load_catalog("jobs.csv", &CatalogOptions::default()).unwrap();
//! let parties = enumerate_parties(&catalog, RuleVariant::Regular, false);
//!
//! let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
//! let pool = embedder.embed_all(&parties).unwrap();
//!
//! let config = TrialConfig::default().with_count(10).with_trials(5);
//! let trials = run_trials(&pool, &config, &CancellationToken::new()).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `fiesta-core` - Job catalog, parties, embeddings, rule-variant enumeration
//! - `fiesta-select` - Selection strategies, trials, comparison matrices
//! - `fiesta-storage` - Catalog CSV loading and embedding persistence

// Re-export core types
pub use fiesta_core::{
    enumerate_parties, Crystal, EmbeddingParams, Error, Job, JobCatalog, Party, PartyEmbedder,
    PartyEmbedding, Result, RuleVariant, StatsBlock, Style, Unlock, Vector,
};

// Re-export selection
pub use fiesta_select::{
    run_trial, run_trials, CancellationToken, ComparisonMatrix, Selection, Selector, TrialConfig,
    TrialResult,
};

// Re-export storage
pub use fiesta_storage::{load_catalog, load_embeddings, save_embeddings, CatalogOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        enumerate_parties, load_catalog, load_embeddings, run_trials, save_embeddings,
        CancellationToken, CatalogOptions, EmbeddingParams, Error, JobCatalog, Party,
        PartyEmbedder, PartyEmbedding, Result, RuleVariant, Selector, StatsBlock, TrialConfig,
        TrialResult,
    };
}
