//! SJF (Shortest Job First), non-preemptive
//!
//! Picks the shortest burst among arrived jobs whenever the CPU is free.
//! A job that starts runs to completion; the resolver is not consulted
//! again until it does.

use super::{idle_server, AlgorithmFamily, AlgorithmStrategy, ResolverView};
use crate::models::Action;

/// Shortest burst first, ties by arrival then id
#[derive(Debug, Clone, Copy, Default)]
pub struct Sjf;

impl AlgorithmStrategy for Sjf {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Scheduling
    }

    fn criterion(&self) -> &'static str {
        "shortest burst"
    }

    fn resolve(&self, view: &ResolverView<'_>) -> Option<Action> {
        let server = idle_server(view)?;
        view.entities
            .eligible(view.now)
            .min_by_key(|e| (e.burst(), e.arrival_time(), e.id()))
            .map(|entity| Action::new(entity.id(), server))
    }
}
