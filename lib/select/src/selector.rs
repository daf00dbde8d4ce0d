//! Party selection strategies
//!
//! Both strategies share one contract: given a pool, a requested count and a
//! distance threshold, return an ordered subset of at most `count` entries.
//!
//! The diversity strategy keeps the pool partitioned into Selected,
//! Available and Unavailable. Each pick moves one Available entry to
//! Selected, then moves every Available entry closer than `eps` to the pick
//! into Unavailable. When Available runs dry before `count` is reached, `eps`
//! shrinks by [`RELAXATION_FACTOR`] and Unavailable is re-tested against all
//! selected entries until something becomes available again.
//!
//! An entry at distance 0 from a selected entry can never become far, so it is
//! excluded for the rest of the trial instead of being retried.

use crate::CancellationToken;
use fiesta_core::{Error, PartyEmbedding, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// `eps` multiplier applied on each relaxation round
pub const RELAXATION_FACTOR: f32 = 0.8;

/// Selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Selector {
    /// Uniform sampling with replacement; `eps` is ignored
    Random,
    /// Greedy sampling with a minimum pairwise distance
    #[default]
    Diversity,
}

/// Result of one selection run
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Selected entries in pick order
    pub entries: Vec<&'a PartyEmbedding>,
    /// `eps` in effect when each entry was picked (not enforced for Random)
    pub accepted_eps: Vec<f32>,
    pub final_eps: f32,
    pub relaxation_rounds: usize,
    /// Original request when `count` exceeded the pool size
    pub clamped_from: Option<usize>,
    /// Entries dropped for being identical to a selected entry
    pub excluded_duplicates: usize,
    /// Set when only duplicates were left before `count` was reached
    pub exhausted: bool,
}

impl<'a> Selection<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().to_string()).collect()
    }
}

impl Selector {
    pub fn as_str(self) -> &'static str {
        match self {
            Selector::Random => "random",
            Selector::Diversity => "diversity",
        }
    }

    /// Select up to `count` entries from `pool`
    pub fn select<'a, R: Rng + ?Sized>(
        self,
        pool: &'a [PartyEmbedding],
        count: usize,
        eps: f32,
        rng: &mut R,
    ) -> Result<Selection<'a>> {
        self.select_cancellable(pool, count, eps, rng, &CancellationToken::new())
    }

    /// Like [`Selector::select`], giving up with [`Error::Cancelled`] at the
    /// next relaxation round once `cancel` fires
    ///
    /// A pool whose entries differ in dimension is rejected with
    /// [`Error::InvalidDimension`].
    pub fn select_cancellable<'a, R: Rng + ?Sized>(
        self,
        pool: &'a [PartyEmbedding],
        count: usize,
        eps: f32,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<Selection<'a>> {
        check_pool_dimension(pool)?;
        let (count, clamped_from) = clamp_count(count, pool.len());
        match self {
            Selector::Random => Ok(select_randomly(pool, count, eps, clamped_from, rng)),
            Selector::Diversity => {
                if !(eps.is_finite() && eps >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "eps must be finite and non-negative, got {}",
                        eps
                    )));
                }
                let mut state = SelectionPool::new(pool, eps);
                let exhausted = !state.fill(count, rng, cancel)?;
                Ok(state.finish(clamped_from, exhausted))
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Selector::Random),
            "diversity" | "embedding" | "embeddings" => Ok(Selector::Diversity),
            other => Err(Error::InvalidConfig(format!("unknown selector '{}'", other))),
        }
    }
}

/// Every entry must share the first entry's dimension
fn check_pool_dimension(pool: &[PartyEmbedding]) -> Result<()> {
    let Some(first) = pool.first() else {
        return Ok(());
    };
    let expected = first.vector().dim();
    match pool.iter().find(|e| e.vector().dim() != expected) {
        Some(odd) => Err(Error::InvalidDimension {
            expected,
            actual: odd.vector().dim(),
        }),
        None => Ok(()),
    }
}

fn clamp_count(count: usize, pool_len: usize) -> (usize, Option<usize>) {
    if count > pool_len {
        warn!(
            requested = count,
            pool = pool_len,
            "requested more parties than the pool holds, clamping to pool size"
        );
        (pool_len, Some(count))
    } else {
        (count, None)
    }
}

fn select_randomly<'a, R: Rng + ?Sized>(
    pool: &'a [PartyEmbedding],
    count: usize,
    eps: f32,
    clamped_from: Option<usize>,
    rng: &mut R,
) -> Selection<'a> {
    let entries: Vec<_> = (0..count)
        .map(|_| &pool[rng.random_range(0..pool.len())])
        .collect();

    Selection {
        accepted_eps: vec![eps; entries.len()],
        entries,
        final_eps: eps,
        relaxation_rounds: 0,
        clamped_from,
        excluded_duplicates: 0,
        exhausted: false,
    }
}

/// Per-trial partition of the pool, by index
///
/// Every index lives in exactly one of `selected`, `available`,
/// `unavailable` or `excluded`. `excluded` is the permanent part of
/// Unavailable: entries identical to something already selected.
struct SelectionPool<'a> {
    pool: &'a [PartyEmbedding],
    selected: Vec<usize>,
    accepted_eps: Vec<f32>,
    available: Vec<usize>,
    unavailable: Vec<usize>,
    excluded: Vec<usize>,
    eps: f32,
    relaxation_rounds: usize,
}

impl<'a> SelectionPool<'a> {
    fn new(pool: &'a [PartyEmbedding], eps: f32) -> Self {
        Self {
            pool,
            selected: Vec::new(),
            accepted_eps: Vec::new(),
            available: (0..pool.len()).collect(),
            unavailable: Vec::new(),
            excluded: Vec::new(),
            eps,
            relaxation_rounds: 0,
        }
    }

    /// Pick until `count` entries are selected. Returns false if the pool ran
    /// out of non-duplicate candidates first.
    fn fill<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        while self.selected.len() < count {
            let chosen = self.pick(rng);
            self.partition_against(chosen);
            self.debug_check_partition();

            if self.selected.len() < count && self.available.is_empty() && !self.relax(cancel)? {
                warn!(
                    selected = self.selected.len(),
                    requested = count,
                    duplicates = self.excluded.len(),
                    "only duplicates of selected parties remain, stopping early"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let slot = rng.random_range(0..self.available.len());
        let chosen = self.available.swap_remove(slot);
        self.selected.push(chosen);
        self.accepted_eps.push(self.eps);
        chosen
    }

    /// Move Available entries closer than `eps` to `chosen` into Unavailable.
    /// Distance exactly `eps` counts as far.
    fn partition_against(&mut self, chosen: usize) {
        let anchor = self.pool[chosen].vector();
        let candidates = std::mem::take(&mut self.available);

        for idx in candidates {
            let distance = anchor.l2_distance(self.pool[idx].vector());
            if distance < self.eps {
                if distance == 0.0 {
                    self.excluded.push(idx);
                } else {
                    self.unavailable.push(idx);
                }
            } else {
                self.available.push(idx);
            }
        }
    }

    /// Shrink `eps` until some Unavailable entry is far from every selected
    /// entry. Returns false when nothing retryable is left.
    fn relax(&mut self, cancel: &CancellationToken) -> Result<bool> {
        while self.available.is_empty() {
            if self.unavailable.is_empty() {
                return Ok(false);
            }
            cancel.check()?;

            self.eps *= RELAXATION_FACTOR;
            self.relaxation_rounds += 1;
            self.available = std::mem::take(&mut self.unavailable);

            for i in 0..self.selected.len() {
                self.partition_against(self.selected[i]);
            }
            self.debug_check_partition();

            debug!(
                round = self.relaxation_rounds,
                eps = self.eps,
                available = self.available.len(),
                unavailable = self.unavailable.len(),
                "relaxed eps"
            );
        }
        Ok(true)
    }

    #[inline]
    fn debug_check_partition(&self) {
        debug_assert_eq!(
            self.selected.len() + self.available.len() + self.unavailable.len() + self.excluded.len(),
            self.pool.len()
        );
    }

    fn finish(self, clamped_from: Option<usize>, exhausted: bool) -> Selection<'a> {
        let pool = self.pool;
        Selection {
            entries: self.selected.iter().map(|&i| &pool[i]).collect(),
            accepted_eps: self.accepted_eps,
            final_eps: self.eps,
            relaxation_rounds: self.relaxation_rounds,
            clamped_from,
            excluded_duplicates: self.excluded.len(),
            exhausted,
        }
    }
}
