//! Deterministic random number generation
//!
//! Randomized scenarios sample their roster through this module only, so a
//! seed fully determines which entities a learner will face.

mod xorshift;

pub use xorshift::RngManager;
