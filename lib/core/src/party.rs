use crate::{Error, JobCatalog, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters (and therefore jobs) in a party
pub const PARTY_SIZE: usize = 4;

/// Separator used when joining job ids into a party key
pub const KEY_SEPARATOR: char = ',';

/// An ordered assignment of four jobs. Slot `i` is the job picked at tier `i`
/// in tiered rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    jobs: [String; PARTY_SIZE],
}

impl Party {
    pub fn new(jobs: [String; PARTY_SIZE]) -> Self {
        Self { jobs }
    }

    pub fn from_ids(ids: [&str; PARTY_SIZE]) -> Self {
        Self {
            jobs: ids.map(str::to_string),
        }
    }

    #[inline]
    pub fn jobs(&self) -> &[String; PARTY_SIZE] {
        &self.jobs
    }

    /// Stable external identity: job ids joined with [`KEY_SEPARATOR`]
    pub fn key(&self) -> String {
        self.jobs.join(KEY_SEPARATOR.to_string().as_str())
    }

    /// Whether any job appears in more than one slot
    pub fn has_duplicates(&self) -> bool {
        (0..PARTY_SIZE).any(|i| self.jobs[i + 1..].contains(&self.jobs[i]))
    }

    /// Catalog positions of the four jobs, failing on the first unknown id
    pub fn resolve(&self, catalog: &JobCatalog) -> Result<[usize; PARTY_SIZE]> {
        let mut positions = [0usize; PARTY_SIZE];
        for (slot, id) in positions.iter_mut().zip(&self.jobs) {
            *slot = catalog.position(id)?;
        }
        Ok(positions)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Party {
    type Err = Error;

    /// Parse a party key back into its four job ids
    fn from_str(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let ids: [&str; PARTY_SIZE] = parts.as_slice().try_into().map_err(|_| {
            Error::InvalidConfig(format!(
                "party key '{}' must contain exactly {} job ids",
                key, PARTY_SIZE
            ))
        })?;
        if ids.iter().any(|id| id.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "party key '{}' contains an empty job id",
                key
            )));
        }
        Ok(Party::from_ids(ids))
    }
}
