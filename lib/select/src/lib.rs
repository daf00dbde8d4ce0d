//! # fiesta Select
//!
//! Picks diverse parties out of an embedded candidate pool.
//!
//! - [`Selector`] - Random or diversity-driven selection over a pool
//! - [`run_trials`] - Independent, reproducible repetitions of a selection
//! - [`ComparisonMatrix`] - Pairwise distances between the parties of one trial
//!
//! ## Example
//!
//! ```rust
//! use fiesta_core::{PartyEmbedding, Vector};
//! use fiesta_select::{run_trials, CancellationToken, TrialConfig};
//!
//! let pool: Vec<PartyEmbedding> = (0..10)
//!     .map(|i| PartyEmbedding::new(format!("p{}", i), Vector::new(vec![i as f32])))
//!     .collect();
//!
//! let config = TrialConfig::default().with_count(3).with_trials(2).with_eps(2.0);
//! let trials = run_trials(&pool, &config, &CancellationToken::new()).unwrap();
//! assert_eq!(trials.len(), 2);
//! ```

pub mod cancel;
pub mod matrix;
pub mod selector;
pub mod trials;

pub use cancel::CancellationToken;
pub use matrix::ComparisonMatrix;
pub use selector::{Selection, Selector, RELAXATION_FACTOR};
pub use trials::{run_trial, run_trials, TrialConfig, TrialResult};
