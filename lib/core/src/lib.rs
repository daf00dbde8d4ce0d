//! # fiesta Core
//!
//! Core library for fiesta party analysis.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`JobCatalog`] - Validated table of jobs with stats, style, unlock tier and equipment
//! - [`Party`] - An ordered assignment of four jobs, identified by its comma-joined key
//! - [`PartyEmbedder`] - Deterministic party to [`Vector`] encoding
//! - [`enumerate_parties`] - Every legal party for a [`RuleVariant`]
//!
//! ## Example
//!
//! ```rust
//! use fiesta_core::{Job, JobCatalog, Unlock, Style, Party, PartyEmbedder, EmbeddingParams};
//!
//! let catalog = JobCatalog::new(
//!     vec![],
//!     vec![],
//!     vec![Job::new("Freelancer", Unlock::Always, Style::Misc)],
//!     "Freelancer",
//! ).unwrap();
//!
//! let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
//! let party = Party::from_ids(["Freelancer"; 4]);
//! let vector = embedder.embed(&party).unwrap();
//! assert_eq!(vector.dim(), embedder.dim());
//! ```

pub mod catalog;
pub mod embedding;
pub mod enumerate;
pub mod error;
pub mod party;
pub mod vector;

pub use catalog::{Crystal, Job, JobCatalog, Style, Unlock, NUM_TIERS};
pub use embedding::{EmbeddingParams, PartyEmbedder, PartyEmbedding, StatsBlock};
pub use enumerate::{enumerate_parties, RuleVariant};
pub use error::{Error, Result};
pub use party::{Party, KEY_SEPARATOR, PARTY_SIZE};
pub use vector::Vector;
