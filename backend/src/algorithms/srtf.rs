//! SRTF (Shortest Remaining Time First), preemptive
//!
//! Considers the running job together with every waiting one and picks the
//! smallest remaining time. When the pick differs from the running job, a
//! preemption is due.
//!
//! On an exact tie the running job keeps the CPU, so equal candidates never
//! cause a context switch.

use super::{AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::{Action, EntityStatus};

/// Smallest remaining time, running job wins ties, then arrival, then id
#[derive(Debug, Clone, Copy, Default)]
pub struct Srtf;

impl AlgorithmStrategy for Srtf {
    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Scheduling
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn criterion(&self) -> &'static str {
        "shortest remaining time"
    }

    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action> {
        let server = view.resources.server()?.id();
        view.entities
            .iter()
            .filter(|e| e.is_eligible(view.now) || e.status() == EntityStatus::InService)
            .min_by_key(|e| {
                let challenger = e.status() != EntityStatus::InService;
                (e.remaining(), challenger, e.arrival_time(), e.id())
            })
            .map(|entity| Action::new(entity.id(), server))
    }
}
