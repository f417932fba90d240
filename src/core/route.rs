//! Pipeline route inference.
//!
//! Connects "pipeline section" points of the same pipeline with a greedy
//! nearest-neighbour matching. There is no ordering data from the source
//! system, so the route is approximated from geography alone.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::geometry::haversine_km;
use super::points::{InspectionPoint, LineSegment};

/// Whether an already-connected point may be picked again as a neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReusePolicy {
    /// Already-connected points do not start a search, and searches prefer
    /// unconnected neighbours. Falls back to a connected neighbour only when
    /// every other point is taken.
    #[default]
    Exclusive,
    /// Every point searches; any point not yet paired with it is a candidate.
    /// Tends to produce hub-and-spoke artifacts.
    AllowReuse,
}

/// Configuration for route inference.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
    pub reuse: ReusePolicy,
    pub parallel: bool,
}

impl RouteConfig {
    /// Sets the reuse policy.
    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    /// Computes pipeline groups on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Per-pipeline summary of an inference run.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroup {
    pub pipeline_id: String,
    pub point_count: usize,
    pub segment_count: usize,
    pub total_length_km: f64,
}

/// Output of [`infer_routes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSet {
    pub segments: Vec<LineSegment>,
    pub groups: Vec<RouteGroup>,
    /// Ids of eligible points dropped for non-finite coordinates.
    pub rejected: Vec<String>,
}

impl RouteSet {
    pub fn segments_for<'a>(&'a self, pipeline_id: &'a str) -> impl Iterator<Item = &'a LineSegment> {
        self.segments
            .iter()
            .filter(move |s| s.pipeline_id == pipeline_id)
    }

    pub fn total_length_km(&self) -> f64 {
        self.groups.iter().map(|g| g.total_length_km).sum()
    }
}

/// Infers route segments with the default configuration.
pub fn infer_segments(points: &[InspectionPoint]) -> Vec<LineSegment> {
    infer_routes(points, &RouteConfig::default()).segments
}

/// Infers line segments between same-pipeline "pipeline section" points.
///
/// Groups appear in the output in order of first appearance in `points`;
/// within a group, segments follow the iteration order of their origin point.
/// The result depends only on the input order, never on timing, so repeated
/// runs over identical input are equal.
pub fn infer_routes(points: &[InspectionPoint], config: &RouteConfig) -> RouteSet {
    let (groups, rejected) = group_sections(points);

    for id in &rejected {
        warn!(point_id = %id, "Skipping pipeline section with non-finite coordinates");
    }

    let per_group: Vec<Vec<LineSegment>> = if config.parallel {
        groups
            .par_iter()
            .map(|(pipeline_id, members)| link_group(pipeline_id, members, config.reuse))
            .collect()
    } else {
        groups
            .iter()
            .map(|(pipeline_id, members)| link_group(pipeline_id, members, config.reuse))
            .collect()
    };

    let mut result = RouteSet {
        rejected,
        ..Default::default()
    };

    for ((pipeline_id, members), segments) in groups.iter().zip(per_group) {
        let summary = RouteGroup {
            pipeline_id: pipeline_id.to_string(),
            point_count: members.len(),
            segment_count: segments.len(),
            total_length_km: segments.iter().map(LineSegment::length_km).sum(),
        };
        debug!(
            pipeline_id = %summary.pipeline_id,
            points = summary.point_count,
            segments = summary.segment_count,
            "Linked pipeline group"
        );
        result.groups.push(summary);
        result.segments.extend(segments);
    }

    result
}

type Group<'a> = (&'a str, Vec<&'a InspectionPoint>);

/// Partitions eligible points by pipeline id, preserving input order.
fn group_sections(points: &[InspectionPoint]) -> (Vec<Group<'_>>, Vec<String>) {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rejected = Vec::new();

    for point in points {
        let Some(pipeline_id) = point.route_key() else {
            continue;
        };

        if !point.has_finite_coordinates() {
            rejected.push(point.id.clone());
            continue;
        }

        let slot = *index.entry(pipeline_id).or_insert_with(|| {
            groups.push((pipeline_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(point);
    }

    (groups, rejected)
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Greedy nearest-neighbour matching within one pipeline group.
fn link_group(pipeline_id: &str, members: &[&InspectionPoint], reuse: ReusePolicy) -> Vec<LineSegment> {
    let mut segments = Vec::new();

    if members.len() < 2 {
        return segments;
    }

    let mut connected: HashSet<usize> = HashSet::new();
    let mut created: HashSet<(usize, usize)> = HashSet::new();

    for current in 0..members.len() {
        if reuse == ReusePolicy::Exclusive && connected.contains(&current) {
            continue;
        }

        let nearest = |skip_connected: bool| {
            nearest_candidate(members, current, |other| {
                !created.contains(&pair_key(current, other))
                    && !(skip_connected && connected.contains(&other))
            })
        };

        let chosen = match reuse {
            ReusePolicy::Exclusive => nearest(true).or_else(|| nearest(false)),
            ReusePolicy::AllowReuse => nearest(false),
        };

        let Some(other) = chosen else {
            continue;
        };

        created.insert(pair_key(current, other));
        connected.insert(current);
        connected.insert(other);
        segments.push(LineSegment::between(
            pipeline_id,
            members[current],
            members[other],
        ));
    }

    segments
}

/// Index of the closest eligible point to `members[current]`.
///
/// Uses a strict comparison, so the first of several equidistant candidates
/// wins and NaN distances are never chosen.
fn nearest_candidate(
    members: &[&InspectionPoint],
    current: usize,
    eligible: impl Fn(usize) -> bool,
) -> Option<usize> {
    let origin = members[current].coordinate();
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in members.iter().enumerate() {
        if idx == current || !eligible(idx) {
            continue;
        }

        let distance = haversine_km(origin, candidate.coordinate());
        match best {
            Some((_, best_distance)) if !(distance < best_distance) => {}
            None if distance.is_nan() => {}
            _ => best = Some((idx, distance)),
        }
    }

    best.map(|(idx, _)| idx)
}
