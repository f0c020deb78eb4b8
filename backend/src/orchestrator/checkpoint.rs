//! Checkpoint - Save/Load Scenario State
//!
//! Serializes a run mid-lesson so it can be resumed later.
//!
//! # Critical Invariants
//!
//! - **Config Matching**: a checkpoint only loads under the config it was
//!   taken with (SHA-256 of the canonical config JSON)
//! - **Model Integrity**: restored registries must satisfy every entity and
//!   resource invariant
//! - **Roster Integrity**: unreleased entities are still pending and not
//!   already registered

use crate::models::{Entity, EntityStatus, ScenarioState};
use crate::orchestrator::engine::ScenarioError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Everything needed to resume a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCheckpoint {
    pub run_id: String,

    /// SHA256 hash of the config (for validation)
    pub config_hash: String,

    pub briefing_acknowledged: bool,

    /// Clock, registries, score, phase, monitor and rejection count
    pub state: ScenarioState,

    /// Entities the generator has not released yet
    pub unreleased: Vec<Entity>,

    /// Events logged before the checkpoint (the log itself is not kept)
    pub event_count: usize,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, ScenarioError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        ScenarioError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        ScenarioError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate checkpoint integrity
///
/// Checks:
/// - Entity and resource invariants of the restored state
/// - Unreleased entities are pending and unique
/// - No unreleased entity is already registered
pub fn validate_checkpoint(checkpoint: &ScenarioCheckpoint) -> Result<(), ScenarioError> {
    checkpoint
        .state
        .validate()
        .map_err(|e| ScenarioError::Checkpoint(format!("Invalid state: {}", e)))?;

    let mut seen = HashSet::new();
    for entity in &checkpoint.unreleased {
        if entity.status() != EntityStatus::Pending {
            return Err(ScenarioError::Checkpoint(format!(
                "Unreleased entity {} is {}",
                entity.id(),
                entity.status()
            )));
        }
        if !seen.insert(entity.id()) || checkpoint.state.entities().get(entity.id()).is_some() {
            return Err(ScenarioError::Checkpoint(format!(
                "Entity {} appears more than once",
                entity.id()
            )));
        }
        entity
            .validate()
            .map_err(|e| ScenarioError::Checkpoint(e.to_string()))?;
    }

    Ok(())
}
