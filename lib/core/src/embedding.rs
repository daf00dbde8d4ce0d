//! Party Embedder
//!
//! Converts a party into a fixed-length vector so parties can be compared by
//! L2 distance. The vector is the concatenation of:
//!
//! 1. one block per progression tier: style distribution followed by the
//!    equipment the party can use at that tier
//! 2. a job-membership block with one slot per catalog job
//! 3. an optional stats block (summed party stats, scaled)
//!
//! Embedding is a pure function of (party, catalog, params): the same inputs
//! always produce the same bits.

use crate::catalog::{Style, NUM_TIERS};
use crate::party::PARTY_SIZE;
use crate::{Error, JobCatalog, Party, Result, Vector};
use ahash::AHashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Weight of one job in a tier's style distribution
pub const STYLE_WEIGHT: f32 = 0.25;

/// Membership value for jobs in the special-weight set
pub const SPECIAL_JOB_WEIGHT: f32 = 0.1;

/// Membership value for any other job in the party
pub const MEMBER_WEIGHT: f32 = 1.0;

/// Computed stat scales are this multiple of the per-column max |value|
pub const STAT_SCALE_FACTOR: f32 = PARTY_SIZE as f32;

/// Batch progress is logged every this many parties
pub const PROGRESS_BATCH: usize = 10_000;

/// How (and whether) summed party stats are appended
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum StatsBlock {
    #[default]
    Disabled,
    /// Scale by 4x the catalog-wide max |value| per stat column
    Auto,
    /// Scale by caller-supplied per-column values
    Scaled(Vec<f32>),
}

/// Parameters for embedding parties
#[derive(Debug, Clone)]
pub struct EmbeddingParams {
    /// Multiplier on equipment components, in (0, 1]
    pub equipment_weight: f32,
    /// Jobs whose membership slot gets [`SPECIAL_JOB_WEIGHT`] instead of 1.0
    pub special_jobs: AHashSet<String>,
    pub stats: StatsBlock,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            equipment_weight: 1.0,
            special_jobs: AHashSet::new(),
            stats: StatsBlock::Disabled,
        }
    }
}

impl EmbeddingParams {
    pub fn with_equipment_weight(mut self, weight: f32) -> Self {
        self.equipment_weight = weight;
        self
    }

    pub fn with_special_jobs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_jobs = jobs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stats(mut self, stats: StatsBlock) -> Self {
        self.stats = stats;
        self
    }
}

/// A party key paired with its embedding. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyEmbedding {
    key: String,
    vector: Vector,
}

impl PartyEmbedding {
    pub fn new(key: impl Into<String>, vector: Vector) -> Self {
        Self {
            key: key.into(),
            vector,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    #[inline]
    pub fn distance(&self, other: &PartyEmbedding) -> f32 {
        self.vector.l2_distance(&other.vector)
    }
}

/// Embeds parties against one catalog with one resolved parameter set
#[derive(Debug, Clone)]
pub struct PartyEmbedder<'a> {
    catalog: &'a JobCatalog,
    equipment_weight: f32,
    membership: Vec<f32>,
    stat_scale: Option<Vec<f32>>,
}

impl<'a> PartyEmbedder<'a> {
    /// Validate `params` and resolve defaults (membership weights, stat scale)
    pub fn new(catalog: &'a JobCatalog, params: &EmbeddingParams) -> Result<Self> {
        let weight = params.equipment_weight;
        if !(weight.is_finite() && weight > 0.0 && weight <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "equipment weight must be in (0, 1], got {}",
                weight
            )));
        }

        for job in &params.special_jobs {
            if catalog.get(job).is_none() {
                warn!(job = %job, "special-weight job is not in the catalog");
            }
        }
        let membership = catalog
            .jobs()
            .iter()
            .map(|job| {
                if params.special_jobs.contains(&job.id) {
                    SPECIAL_JOB_WEIGHT
                } else {
                    MEMBER_WEIGHT
                }
            })
            .collect();

        let stat_scale = match &params.stats {
            StatsBlock::Disabled => None,
            StatsBlock::Auto => Some(
                catalog
                    .max_abs_stats()
                    .into_iter()
                    .map(|m| if m > 0.0 { m * STAT_SCALE_FACTOR } else { 1.0 })
                    .collect(),
            ),
            StatsBlock::Scaled(scale) => {
                if scale.len() != catalog.num_stats() {
                    return Err(Error::ShapeMismatch {
                        what: "stat max-value vector".to_string(),
                        expected: catalog.num_stats(),
                        actual: scale.len(),
                    });
                }
                if let Some(bad) = scale.iter().find(|v| !v.is_finite() || **v == 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "stat max values must be finite and non-zero, got {}",
                        bad
                    )));
                }
                Some(scale.clone())
            }
        };

        Ok(Self {
            catalog,
            equipment_weight: weight,
            membership,
            stat_scale,
        })
    }

    pub fn catalog(&self) -> &JobCatalog {
        self.catalog
    }

    /// Length of one tier block: style categories then equipment categories
    #[inline]
    pub fn tier_dim(&self) -> usize {
        Style::COUNT + self.catalog.num_equipment()
    }

    /// Total embedding dimension: 4*(4+E) + J (+S when stats are enabled)
    pub fn dim(&self) -> usize {
        let stats = self.stat_scale.as_ref().map_or(0, Vec::len);
        NUM_TIERS * self.tier_dim() + self.catalog.len() + stats
    }

    /// Embed a single party
    pub fn embed(&self, party: &Party) -> Result<Vector> {
        let positions = party.resolve(self.catalog)?;
        let mut data = Vec::with_capacity(self.dim());

        self.push_progression(&positions, &mut data);
        self.push_membership(&positions, &mut data);
        if let Some(scale) = &self.stat_scale {
            self.push_stats(&positions, scale, &mut data);
        }

        Ok(Vector::new(data))
    }

    /// Only the tier blocks (style + equipment) of a party's embedding
    pub fn embed_progression(&self, party: &Party) -> Result<Vector> {
        let positions = party.resolve(self.catalog)?;
        let mut data = Vec::with_capacity(NUM_TIERS * self.tier_dim());
        self.push_progression(&positions, &mut data);
        Ok(Vector::new(data))
    }

    /// Embed every party, preserving input order
    pub fn embed_all(&self, parties: &[Party]) -> Result<Vec<PartyEmbedding>> {
        let total = parties.len();
        let done = AtomicUsize::new(0);
        debug!(total, dim = self.dim(), "embedding parties");

        let embeddings = parties
            .par_iter()
            .map(|party| {
                let vector = self.embed(party)?;
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                if n % PROGRESS_BATCH == 0 {
                    info!(embedded = n, total, "embedding progress");
                }
                Ok(PartyEmbedding::new(party.key(), vector))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(total, "embedded all parties");
        Ok(embeddings)
    }

    /// Tier t sees the members that joined by then (slots 0..=t) whose unlock
    /// tier is <= t. Each distinct job adds 0.25 to its style; equipment is
    /// OR-ed. With nobody available every character is the basic job.
    fn push_progression(&self, positions: &[usize; PARTY_SIZE], data: &mut Vec<f32>) {
        let num_equipment = self.catalog.num_equipment();

        for tier in 0..NUM_TIERS {
            let mut style = [0.0f32; Style::COUNT];
            let mut equipment = vec![false; num_equipment];
            let mut seen: Vec<usize> = Vec::with_capacity(PARTY_SIZE);

            for &pos in &positions[..=tier] {
                let job = self.catalog.job_at(pos);
                if !job.unlock.available_at(tier) || seen.contains(&pos) {
                    continue;
                }
                seen.push(pos);
                style[job.style.index()] += STYLE_WEIGHT;
                for (slot, &usable) in equipment.iter_mut().zip(&job.equipment) {
                    *slot |= usable;
                }
            }

            if seen.is_empty() {
                style[Style::Misc.index()] = STYLE_WEIGHT;
                equipment.copy_from_slice(&self.catalog.basic_job().equipment);
            }

            data.extend_from_slice(&style);
            data.extend(
                equipment
                    .into_iter()
                    .map(|usable| if usable { self.equipment_weight } else { 0.0 }),
            );
        }
    }

    /// Repeated jobs still count once
    fn push_membership(&self, positions: &[usize; PARTY_SIZE], data: &mut Vec<f32>) {
        let start = data.len();
        data.resize(start + self.catalog.len(), 0.0);
        for &pos in positions {
            data[start + pos] = self.membership[pos];
        }
    }

    fn push_stats(&self, positions: &[usize; PARTY_SIZE], scale: &[f32], data: &mut Vec<f32>) {
        let mut sums = vec![0.0f32; scale.len()];
        for &pos in positions {
            for (sum, stat) in sums.iter_mut().zip(&self.catalog.job_at(pos).stats) {
                *sum += stat;
            }
        }
        data.extend(sums.iter().zip(scale).map(|(sum, max)| sum / max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::catalog::{Job, Unlock};

    fn regular_party() -> Party {
        Party::from_ids(["Knight", "BlackMage", "Thief", "Dragoon"])
    }

    #[test]
    fn test_single_basic_job_catalog() {
        let catalog = JobCatalog::new(
            vec![],
            vec![],
            vec![Job::new("Freelancer", Unlock::Always, Style::Misc)],
            "Freelancer",
        )
        .unwrap();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        let party = Party::from_ids(["Freelancer"; 4]);

        let progression = embedder.embed_progression(&party).unwrap();
        let expected: Vec<f32> = [0.0, 0.0, 0.0, 0.25].repeat(4);
        assert_eq!(progression.as_slice(), expected.as_slice());

        let full = embedder.embed(&party).unwrap();
        assert_eq!(full.dim(), 17);
        assert_eq!(&full.as_slice()[..16], expected.as_slice());
        assert_eq!(full.as_slice()[16], 1.0);
    }

    #[test]
    fn test_regular_party_embedding() {
        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        let v = embedder.embed(&regular_party()).unwrap();

        #[rustfmt::skip]
        let expected = vec![
            0.25, 0.0, 0.0, 0.0,    1.0, 0.0, 1.0,
            0.25, 0.0, 0.25, 0.0,   1.0, 1.0, 1.0,
            0.25, 0.25, 0.25, 0.0,  1.0, 1.0, 1.0,
            0.5, 0.25, 0.25, 0.0,   1.0, 1.0, 1.0,
            0.0, 1.0, 1.0, 1.0, 1.0, 0.0,
        ];
        assert_eq!(v.as_slice(), expected.as_slice());
        assert_eq!(v.dim(), embedder.dim());
        assert_eq!(embedder.dim(), 4 * (4 + 3) + 6);
    }

    #[test]
    fn test_unavailable_tier_falls_back_to_basic_job() {
        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        // Thief unlocks at Fire, so nobody is usable at Wind
        let party = Party::from_ids(["Thief", "Knight", "BlackMage", "Dragoon"]);
        let v = embedder.embed_progression(&party).unwrap();

        assert_eq!(&v.as_slice()[..7], &[0.0, 0.0, 0.0, 0.25, 1.0, 0.0, 0.0]);
        assert_eq!(&v.as_slice()[7..14], &[0.25, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_late_jobs_never_available() {
        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        let v = embedder
            .embed_progression(&Party::from_ids(["Mime"; 4]))
            .unwrap();
        let expected: Vec<f32> = [0.0, 0.0, 0.0, 0.25, 1.0, 0.0, 0.0].repeat(4);
        assert_eq!(v.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_equipment_weight_scales_equipment_and_fallback() {
        let catalog = sample_catalog();
        let params = EmbeddingParams::default().with_equipment_weight(0.5);
        let embedder = PartyEmbedder::new(&catalog, &params).unwrap();

        let v = embedder.embed(&regular_party()).unwrap();
        assert_eq!(&v.as_slice()[..7], &[0.25, 0.0, 0.0, 0.0, 0.5, 0.0, 0.5]);

        let fallback = embedder
            .embed_progression(&Party::from_ids(["Mime"; 4]))
            .unwrap();
        assert_eq!(&fallback.as_slice()[4..7], &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_equipment_weight() {
        let catalog = sample_catalog();
        for weight in [0.0, -0.5, 1.5, f32::NAN] {
            let params = EmbeddingParams::default().with_equipment_weight(weight);
            assert!(matches!(
                PartyEmbedder::new(&catalog, &params),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_membership_dedup_and_special_weight() {
        let catalog = sample_catalog();
        let params = EmbeddingParams::default().with_special_jobs(["Knight"]);
        let embedder = PartyEmbedder::new(&catalog, &params).unwrap();
        let party = Party::from_ids(["Knight", "Knight", "Thief", "Thief"]);
        let v = embedder.embed(&party).unwrap();

        let membership = &v.as_slice()[28..34];
        assert_eq!(membership, &[0.0, 0.1, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_default_special_set_is_empty() {
        let params = EmbeddingParams::default();
        assert!(params.special_jobs.is_empty());

        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &params).unwrap();
        let v = embedder.embed(&regular_party()).unwrap();
        assert!(v.as_slice()[28..34].iter().all(|&m| m == 0.0 || m == 1.0));
    }

    #[test]
    fn test_auto_stats_block() {
        let catalog = sample_catalog();
        let params = EmbeddingParams::default().with_stats(StatsBlock::Auto);
        let embedder = PartyEmbedder::new(&catalog, &params).unwrap();
        assert_eq!(embedder.dim(), 4 * (4 + 3) + 6 + 4);

        let v = embedder.embed(&regular_party()).unwrap();
        let stats = &v.as_slice()[34..];
        let expected = [15.0 / 40.0, 8.0 / 36.0, 10.0 / 32.0, 6.0 / 48.0];
        for (got, want) in stats.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn test_scaled_stats_shape_mismatch() {
        let catalog = sample_catalog();
        let params = EmbeddingParams::default().with_stats(StatsBlock::Scaled(vec![1.0, 2.0]));
        let err = PartyEmbedder::new(&catalog, &params).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 4, actual: 2, .. }));
    }

    #[test]
    fn test_scaled_stats_used_verbatim() {
        let catalog = sample_catalog();
        let params =
            EmbeddingParams::default().with_stats(StatsBlock::Scaled(vec![1.0, 1.0, 2.0, -1.0]));
        let embedder = PartyEmbedder::new(&catalog, &params).unwrap();
        let v = embedder.embed(&regular_party()).unwrap();
        assert_eq!(&v.as_slice()[34..], &[15.0, 8.0, 5.0, -6.0]);
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let catalog = sample_catalog();
        let params = EmbeddingParams::default()
            .with_equipment_weight(0.3)
            .with_stats(StatsBlock::Auto);
        let a = PartyEmbedder::new(&catalog, &params).unwrap();
        let b = PartyEmbedder::new(&catalog, &params).unwrap();

        let party = Party::from_ids(["Dragoon", "Freelancer", "Mime", "BlackMage"]);
        let va = a.embed(&party).unwrap();
        let vb = b.embed(&party).unwrap();
        let bits = |v: &Vector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&va), bits(&vb));
    }

    #[test]
    fn test_embed_all_preserves_order() {
        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        let parties = vec![
            regular_party(),
            Party::from_ids(["Mime"; 4]),
            Party::from_ids(["Freelancer", "Knight", "Thief", "Mime"]),
        ];

        let embeddings = embedder.embed_all(&parties).unwrap();
        assert_eq!(embeddings.len(), 3);
        for (party, embedding) in parties.iter().zip(&embeddings) {
            assert_eq!(embedding.key(), party.key());
            assert_eq!(embedding.vector(), &embedder.embed(party).unwrap());
            assert_eq!(embedding.vector().dim(), embedder.dim());
        }
    }

    #[test]
    fn test_embed_all_unknown_job() {
        let catalog = sample_catalog();
        let embedder = PartyEmbedder::new(&catalog, &EmbeddingParams::default()).unwrap();
        let parties = vec![regular_party(), Party::from_ids(["Knight", "Ninja", "Thief", "Mime"])];
        assert!(matches!(embedder.embed_all(&parties), Err(Error::UnknownJob(id)) if id == "Ninja"));
    }
}
