//! Legal party enumeration per rule variant
//!
//! Produces every party a rule variant allows, in nested-loop order over the
//! catalog. The unconstrained variant yields J^4 candidates before duplicate
//! filtering, so callers should expect lists in the hundreds of thousands.

use crate::catalog::{Crystal, NUM_TIERS};
use crate::party::PARTY_SIZE;
use crate::{Error, JobCatalog, Party, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Rule variants controlling which jobs may fill each party slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleVariant {
    /// Slot i holds a job from crystal i
    Regular,
    /// Slot i holds a job from any crystal up to and including i
    Typhoon,
    /// Crystals in reverse: slot 0 from Earth, slot 3 from any crystal
    Volcano,
    /// Any job in any slot
    Meteor,
}

impl RuleVariant {
    pub const ALL: [RuleVariant; 4] = [
        RuleVariant::Regular,
        RuleVariant::Typhoon,
        RuleVariant::Volcano,
        RuleVariant::Meteor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleVariant::Regular => "Regular",
            RuleVariant::Typhoon => "Typhoon",
            RuleVariant::Volcano => "Volcano",
            RuleVariant::Meteor => "Meteor",
        }
    }

    /// Candidate job positions for each slot
    fn slot_candidates(self, catalog: &JobCatalog) -> [Vec<usize>; PARTY_SIZE] {
        let crystal_jobs = |crystal: Crystal| -> Vec<usize> {
            catalog.crystal_positions(crystal).collect()
        };

        match self {
            RuleVariant::Regular => Crystal::ALL.map(crystal_jobs),
            RuleVariant::Typhoon => cumulative(Crystal::ALL.map(crystal_jobs)),
            RuleVariant::Volcano => {
                let mut reversed = Crystal::ALL;
                reversed.reverse();
                cumulative(reversed.map(crystal_jobs))
            }
            RuleVariant::Meteor => {
                let all: Vec<usize> = (0..catalog.len()).collect();
                std::array::from_fn(|_| all.clone())
            }
        }
    }
}

/// Slot i gets its own jobs followed by every earlier slot's jobs
fn cumulative(per_slot: [Vec<usize>; NUM_TIERS]) -> [Vec<usize>; NUM_TIERS] {
    let mut previous: Vec<usize> = Vec::new();
    per_slot.map(|mut jobs| {
        jobs.extend_from_slice(&previous);
        previous = jobs.clone();
        jobs
    })
}

impl fmt::Display for RuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RuleVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownVariant(s.to_string()))
    }
}

/// Enumerate every legal party for `variant`
///
/// Parties repeating a job are dropped unless `allow_duplicates` is set.
/// Regular parties draw each slot from a different crystal, so they never
/// repeat a job either way.
pub fn enumerate_parties(
    catalog: &JobCatalog,
    variant: RuleVariant,
    allow_duplicates: bool,
) -> Vec<Party> {
    let [s0, s1, s2, s3] = variant.slot_candidates(catalog);
    let id = |pos: usize| catalog.job_at(pos).id.clone();

    let mut parties = Vec::with_capacity(s0.len() * s1.len() * s2.len() * s3.len());
    for &a in &s0 {
        for &b in &s1 {
            for &c in &s2 {
                for &d in &s3 {
                    let distinct = a != b && a != c && a != d && b != c && b != d && c != d;
                    if allow_duplicates || distinct {
                        parties.push(Party::new([id(a), id(b), id(c), id(d)]));
                    }
                }
            }
        }
    }

    debug!(variant = %variant, count = parties.len(), "enumerated parties");
    parties
}
