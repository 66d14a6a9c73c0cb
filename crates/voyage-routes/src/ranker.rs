//! Ranking of search results under a transport preference
//!
//! Both rankings first drop segments the preference does not admit (only
//! when some preference is set), then order by duration. Sorting is stable,
//! so equal durations keep the service's order.

use voyage_domain::{RouteSegment, TransportKind, TransportPreference};

/// Default number of options offered for a direct trip
pub const DEFAULT_OPTIONS: usize = 4;

/// Default number of candidates ranked per leg
pub const DEFAULT_LEG_CANDIDATES: usize = 3;

/// Ranking sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRanker {
    /// Options returned by [`RouteRanker::diversified`]
    pub options: usize,
    /// Candidates returned by [`RouteRanker::fastest`]
    pub leg_candidates: usize,
}

impl RouteRanker {
    /// Create a ranker with explicit sizes
    pub fn new(options: usize, leg_candidates: usize) -> Self {
        Self {
            options,
            leg_candidates,
        }
    }

    /// Diversified top options, see [`rank_diversified`]
    pub fn diversified(
        &self,
        segments: &[RouteSegment],
        pref: &TransportPreference,
    ) -> Vec<RouteSegment> {
        rank_diversified(segments, pref, self.options)
    }

    /// Fastest candidates, see [`rank_fastest`]
    pub fn fastest(
        &self,
        segments: &[RouteSegment],
        pref: &TransportPreference,
    ) -> Vec<RouteSegment> {
        rank_fastest(segments, pref, self.leg_candidates)
    }
}

impl Default for RouteRanker {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIONS, DEFAULT_LEG_CANDIDATES)
    }
}

/// Filter by preference and sort by duration
fn filtered_by_duration(
    segments: &[RouteSegment],
    pref: &TransportPreference,
) -> Vec<RouteSegment> {
    let mut candidates: Vec<RouteSegment> = segments
        .iter()
        .filter(|segment| pref.admits(segment.kind))
        .cloned()
        .collect();
    candidates.sort_by(|a, b| a.duration_secs.total_cmp(&b.duration_secs));
    candidates
}

/// Up to `n` options covering as many transport kinds as possible
///
/// The fastest segment of each of train, plane and bus is taken first (in
/// duration order), then the remaining slots are filled with the fastest
/// segments not yet chosen.
pub fn rank_diversified(
    segments: &[RouteSegment],
    pref: &TransportPreference,
    n: usize,
) -> Vec<RouteSegment> {
    let sorted = filtered_by_duration(segments, pref);

    let mut chosen: Vec<usize> = Vec::with_capacity(n);
    let mut seen: Vec<TransportKind> = Vec::new();
    for (idx, segment) in sorted.iter().enumerate() {
        if segment.kind.is_preferable() && !seen.contains(&segment.kind) {
            seen.push(segment.kind);
            chosen.push(idx);
        }
    }
    for idx in 0..sorted.len() {
        if chosen.len() >= n {
            break;
        }
        if !chosen.contains(&idx) {
            chosen.push(idx);
        }
    }
    chosen.truncate(n);

    chosen.into_iter().map(|idx| sorted[idx].clone()).collect()
}

/// The `k` fastest admitted segments
pub fn rank_fastest(
    segments: &[RouteSegment],
    pref: &TransportPreference,
    k: usize,
) -> Vec<RouteSegment> {
    let mut sorted = filtered_by_duration(segments, pref);
    sorted.truncate(k);
    sorted
}
