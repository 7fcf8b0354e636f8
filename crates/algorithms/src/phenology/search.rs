//! Ranking candidate sites by phenological similarity to a reference
//!
//! The reference series is processed once. Every candidate is cleaned,
//! smoothed and landmarked, warped onto the reference timeline through the
//! two landmark sets, and scored against the reference's smoothed curve.
//! Candidates are independent, so they are evaluated in parallel; ranking
//! happens after all of them are back, in submission order.

use serde::{Deserialize, Serialize};
use terroir_core::{Error, Result, SeriesProvider, Site, TimeSeries};
use tracing::{debug, info, warn};

use super::landmarks::{LandmarkExtractor, LandmarkParams, LandmarkSet, PhenologyProfile};
use super::similarity::{similarity, SimilarityParams};
use super::warp::warp_curve;
use crate::maybe_rayon::*;

/// Parameters for a similarity search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Minimum similarity (inclusive) for a candidate to be returned
    pub threshold: f64,
    /// Maximum number of matches returned
    pub top_n: usize,
    pub landmarks: LandmarkParams,
    pub similarity: SimilarityParams,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            threshold: 60.0,
            top_n: 10,
            landmarks: LandmarkParams::default(),
            similarity: SimilarityParams::default(),
        }
    }
}

impl SearchParams {
    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "threshold",
                value: self.threshold.to_string(),
                reason: "threshold must be finite".into(),
            });
        }
        if self.top_n == 0 {
            return Err(Error::InvalidParameter {
                name: "top_n",
                value: "0".into(),
                reason: "at least one match must be requested".into(),
            });
        }
        Ok(())
    }
}

/// Outcome for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<I> {
    pub id: I,
    /// Similarity score in (0, 100]
    pub similarity: f64,
    /// Raw slope distance
    pub distance: f64,
    /// Candidate curve after cleaning and smoothing
    pub smoothed: Vec<f64>,
    /// Smoothed curve warped onto the reference timeline
    pub warped: Vec<f64>,
    pub landmarks: LandmarkSet,
}

/// Bookkeeping for one ranking run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Candidates submitted
    pub candidates: usize,
    /// Candidates skipped because their series could not be processed
    pub rejected: usize,
    /// Candidates scored but under the threshold
    pub below_threshold: usize,
    /// Matches returned after truncation
    pub returned: usize,
}

/// Ranked matches plus the processed reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking<I> {
    pub reference: PhenologyProfile,
    pub matches: Vec<MatchResult<I>>,
    pub summary: SearchSummary,
}

/// A processed reference series ready to score candidates against.
#[derive(Debug, Clone)]
pub struct PhenologyMatcher {
    extractor: LandmarkExtractor,
    reference: PhenologyProfile,
    params: SearchParams,
}

impl PhenologyMatcher {
    /// Process the reference series.
    ///
    /// Fails with [`Error::ReferenceUnusable`] when the reference cannot be
    /// landmarked; invalid parameters are reported as such.
    pub fn new(reference: &TimeSeries, params: SearchParams) -> Result<Self> {
        params.validate()?;
        let extractor = LandmarkExtractor::new(params.landmarks)?;
        let reference = extractor
            .extract(reference)
            .map_err(|e| Error::ReferenceUnusable(Box::new(e)))?;

        if reference.landmarks.is_fallback() {
            warn!("reference series has no detectable landmarks, matching against the fallback calendar");
        }

        Ok(Self {
            extractor,
            reference,
            params,
        })
    }

    pub fn reference(&self) -> &PhenologyProfile {
        &self.reference
    }

    /// Run one candidate through extraction, warping and scoring.
    pub fn evaluate<I>(&self, id: I, series: &TimeSeries) -> Result<MatchResult<I>> {
        let profile = self.extractor.extract(series)?;
        let warped = warp_curve(
            &self.reference.smoothed,
            &profile.smoothed,
            &self.reference.landmarks,
            &profile.landmarks,
        )?;
        let score = similarity(&self.reference.smoothed, &warped, &self.params.similarity)?;

        Ok(MatchResult {
            id,
            similarity: score.score,
            distance: score.distance,
            smoothed: profile.smoothed,
            warped,
            landmarks: profile.landmarks,
        })
    }

    /// Evaluate all candidates and return the best matches.
    ///
    /// Candidates that fail processing are skipped and counted. Fails with
    /// [`Error::NoMatchFound`] when no candidate reaches the threshold.
    pub fn rank<I>(&self, candidates: &[(I, TimeSeries)]) -> Result<Ranking<I>>
    where
        I: Clone + Send + Sync,
    {
        let outcomes: Vec<Result<MatchResult<I>>> = candidates
            .par_iter()
            .map(|(id, series)| self.evaluate(id.clone(), series))
            .collect();

        let mut summary = SearchSummary {
            candidates: candidates.len(),
            ..SearchSummary::default()
        };
        let mut scored = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => scored.push(result),
                Err(e) if e.is_rejection() => {
                    debug!(candidate = index, error = %e, "candidate rejected");
                    summary.rejected += 1;
                }
                Err(e) => {
                    warn!(candidate = index, error = %e, "candidate failed");
                    summary.rejected += 1;
                }
            }
        }

        summary.below_threshold = scored
            .iter()
            .filter(|m| m.similarity < self.params.threshold)
            .count();
        let matches = select_matches(scored, self.params.threshold, self.params.top_n)?;
        summary.returned = matches.len();

        info!(
            candidates = summary.candidates,
            rejected = summary.rejected,
            returned = summary.returned,
            best = matches.first().map(|m| m.similarity),
            "phenology search complete"
        );

        Ok(Ranking {
            reference: self.reference.clone(),
            matches,
            summary,
        })
    }
}

/// Filter, sort and truncate scored candidates.
///
/// Candidates scoring below `threshold` are dropped; the rest are ordered by
/// similarity, highest first, keeping submission order among equal scores,
/// and cut to `top_n`.
pub fn select_matches<I>(
    scored: Vec<MatchResult<I>>,
    threshold: f64,
    top_n: usize,
) -> Result<Vec<MatchResult<I>>> {
    let evaluated = scored.len();
    let mut kept: Vec<MatchResult<I>> = scored
        .into_iter()
        .filter(|m| m.similarity >= threshold)
        .collect();

    if kept.is_empty() {
        return Err(Error::NoMatchFound {
            evaluated,
            threshold,
        });
    }

    kept.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    kept.truncate(top_n);
    Ok(kept)
}

/// Rank candidate series against a reference series.
pub fn rank<I>(
    reference: &TimeSeries,
    candidates: &[(I, TimeSeries)],
    params: SearchParams,
) -> Result<Ranking<I>>
where
    I: Clone + Send + Sync,
{
    PhenologyMatcher::new(reference, params)?.rank(candidates)
}

/// Fetch series for a reference site and candidate sites, then rank them.
pub fn search_sites<P: SeriesProvider>(
    provider: &P,
    reference: &Site,
    candidates: &[Site],
    year: i32,
    params: SearchParams,
) -> Result<Ranking<Site>> {
    let matcher = PhenologyMatcher::new(&provider.series(reference, year), params)?;
    let series: Vec<(Site, TimeSeries)> = candidates
        .par_iter()
        .map(|site| (site.clone(), provider.series(site, year)))
        .collect();
    matcher.rank(&series)
}
