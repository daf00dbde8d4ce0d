//! Job catalog
//!
//! Read-only table of jobs keyed by identifier. Every job in a catalog shares
//! the same stat-vector and equipment-vector length; [`JobCatalog::new`]
//! enforces that once so embedding code can index without checks.

use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of progression tiers (one per crystal)
pub const NUM_TIERS: usize = 4;

/// Crystals in progression order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crystal {
    Wind,
    Water,
    Fire,
    Earth,
}

impl Crystal {
    pub const ALL: [Crystal; NUM_TIERS] = [Crystal::Wind, Crystal::Water, Crystal::Fire, Crystal::Earth];

    #[inline]
    pub fn tier(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Crystal::Wind => "Wind",
            Crystal::Water => "Water",
            Crystal::Fire => "Fire",
            Crystal::Earth => "Earth",
        }
    }
}

impl fmt::Display for Crystal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Crystal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Crystal::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown crystal '{}'", s)))
    }
}

/// When a job becomes usable during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unlock {
    /// Usable from the very start (the basic job)
    Always,
    /// Unlocked by a crystal
    Crystal(Crystal),
    /// Unlocked after the four crystals, so never inside the tiered progression
    Late,
}

impl Unlock {
    /// Tier index: -1 for [`Unlock::Always`], 0..=3 for crystals, 4 for [`Unlock::Late`]
    #[inline]
    pub fn tier_index(self) -> i32 {
        match self {
            Unlock::Always => -1,
            Unlock::Crystal(crystal) => crystal.tier() as i32,
            Unlock::Late => NUM_TIERS as i32,
        }
    }

    /// Whether a job with this unlock is usable at `tier`
    #[inline]
    pub fn available_at(self, tier: usize) -> bool {
        self.tier_index() <= tier as i32
    }
}

/// Equipment style of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    Heavy,
    Clothes,
    Mage,
    Misc,
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Heavy, Style::Clothes, Style::Mage, Style::Misc];
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Heavy => "Heavy",
            Style::Clothes => "Clothes",
            Style::Mage => "Mage",
            Style::Misc => "Misc",
        }
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown style '{}'", s)))
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub unlock: Unlock,
    pub style: Style,
    pub stats: Vec<f32>,
    pub equipment: Vec<bool>,
}

impl Job {
    pub fn new(id: impl Into<String>, unlock: Unlock, style: Style) -> Self {
        Self {
            id: id.into(),
            unlock,
            style,
            stats: Vec::new(),
            equipment: Vec::new(),
        }
    }

    pub fn with_stats(mut self, stats: Vec<f32>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_equipment(mut self, equipment: Vec<bool>) -> Self {
        self.equipment = equipment;
        self
    }
}

/// Validated, read-only collection of jobs in catalog order
#[derive(Debug, Clone)]
pub struct JobCatalog {
    stat_columns: Vec<String>,
    equipment_columns: Vec<String>,
    jobs: Vec<Job>,
    index: AHashMap<String, usize>,
    basic_job: usize,
}

impl JobCatalog {
    /// Build a catalog, checking ids are unique, vector shapes agree with the
    /// column lists, and `basic_job` (the fallback equipment source) exists.
    pub fn new(
        stat_columns: Vec<String>,
        equipment_columns: Vec<String>,
        jobs: Vec<Job>,
        basic_job: &str,
    ) -> Result<Self> {
        let mut index = AHashMap::with_capacity(jobs.len());

        for (i, job) in jobs.iter().enumerate() {
            if job.id.contains(crate::party::KEY_SEPARATOR) {
                return Err(Error::InvalidConfig(format!(
                    "job id '{}' contains the party key separator",
                    job.id
                )));
            }
            if job.stats.len() != stat_columns.len() {
                return Err(Error::ShapeMismatch {
                    what: format!("stats of job '{}'", job.id),
                    expected: stat_columns.len(),
                    actual: job.stats.len(),
                });
            }
            if job.equipment.len() != equipment_columns.len() {
                return Err(Error::ShapeMismatch {
                    what: format!("equipment of job '{}'", job.id),
                    expected: equipment_columns.len(),
                    actual: job.equipment.len(),
                });
            }
            if index.insert(job.id.clone(), i).is_some() {
                return Err(Error::DuplicateJob(job.id.clone()));
            }
        }

        let basic_job = *index
            .get(basic_job)
            .ok_or_else(|| Error::UnknownJob(basic_job.to_string()))?;

        Ok(Self {
            stat_columns,
            equipment_columns,
            jobs,
            index,
            basic_job,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn stat_columns(&self) -> &[String] {
        &self.stat_columns
    }

    pub fn equipment_columns(&self) -> &[String] {
        &self.equipment_columns
    }

    #[inline]
    pub fn num_stats(&self) -> usize {
        self.stat_columns.len()
    }

    #[inline]
    pub fn num_equipment(&self) -> usize {
        self.equipment_columns.len()
    }

    /// Catalog position of a job
    pub fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownJob(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.index.get(id).map(|&i| &self.jobs[i])
    }

    #[inline]
    pub fn job_at(&self, position: usize) -> &Job {
        &self.jobs[position]
    }

    /// The default job every character falls back to
    pub fn basic_job(&self) -> &Job {
        &self.jobs[self.basic_job]
    }

    /// Positions of the jobs unlocked by `crystal`, in catalog order
    pub fn crystal_positions(&self, crystal: Crystal) -> impl Iterator<Item = usize> + '_ {
        self.jobs
            .iter()
            .enumerate()
            .filter(move |(_, job)| job.unlock == Unlock::Crystal(crystal))
            .map(|(i, _)| i)
    }

    /// Per stat column, the maximum absolute value over all jobs
    pub fn max_abs_stats(&self) -> Vec<f32> {
        let mut max = vec![0.0f32; self.num_stats()];
        for job in &self.jobs {
            for (m, v) in max.iter_mut().zip(&job.stats) {
                *m = m.max(v.abs());
            }
        }
        max
    }
}
