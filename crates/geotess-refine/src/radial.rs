//! Radial stage: interval splits around seed nodes.

use std::collections::{BTreeMap, BTreeSet};

use geotess_model::Profile;

/// Radii at which a seed node asks for new nodes: the midpoints of the
/// intervals on either side of `node`. Only n-point profiles are refined.
pub(crate) fn split_radii(profile: &Profile, node: usize) -> Vec<f32> {
    let Profile::NPoint { radii, .. } = profile else {
        return Vec::new();
    };
    let below = node.checked_sub(1);
    let above = (node + 1 < radii.len()).then_some(node);
    below
        .into_iter()
        .chain(above)
        .filter_map(|j| profile.interval_midpoint(j))
        .collect()
}

/// Interval indices to split per (vertex, layer).
///
/// A radius selects the interval of the target profile that strictly
/// contains it; repeated requests for one interval collapse.
#[derive(Debug, Default)]
pub(crate) struct RadialPlan {
    splits: BTreeMap<(u32, usize), BTreeSet<usize>>,
}

impl RadialPlan {
    pub fn request(&mut self, vertex: u32, layer: usize, profile: &Profile, radii: &[f32]) {
        let intervals: Vec<usize> = radii
            .iter()
            .filter_map(|&r| profile.interval_containing(r))
            .collect();
        if !intervals.is_empty() {
            self.splits
                .entry((vertex, layer))
                .or_default()
                .extend(intervals);
        }
    }

    /// Total number of intervals that will be split.
    pub fn n_splits(&self) -> usize {
        self.splits.values().map(BTreeSet::len).sum()
    }

    pub fn n_profiles(&self) -> usize {
        self.splits.len()
    }

    /// Apply every split to `profiles`, indexed `[vertex][layer]`.
    pub fn apply(&self, profiles: &mut [Vec<Profile>]) {
        for (&(vertex, layer), intervals) in &self.splits {
            let cell = &mut profiles[vertex as usize][layer];
            *cell = cell.split_intervals(intervals);
        }
    }
}
