//! Best-Fit memory allocation
//!
//! Places the current request into the partition whose free space is the
//! smallest that still fits, leaving the least leftover.

use super::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::Action;

/// Tightest fitting partition, ties by declaration order
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl AlgorithmStrategy for BestFit {
    fn name(&self) -> &'static str {
        "Best-Fit"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Allocation
    }

    fn criterion(&self) -> &'static str {
        "smallest partition that fits"
    }

    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action> {
        let request = view.head_of_line()?;
        view.resources
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_server() && r.can_fit(request.size()))
            .min_by_key(|(position, r)| (r.remaining_capacity(), *position))
            .map(|(_, r)| Action::new(request.id(), r.id()))
    }
}
