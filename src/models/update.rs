//! Reported incident update.

use serde::{Deserialize, Serialize};

/// Identity of an update within one provider: `(incident_id, update_id)`.
pub type UpdateKey = (String, String);

/// A newly detected incident update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentUpdate {
    /// Parent incident identifier
    pub incident_id: String,

    /// Incident display name as seen when the update was detected
    pub incident_name: String,

    /// Update identifier, unique within the incident
    pub update_id: String,

    /// Timestamp exactly as supplied by the source
    pub created_at: String,

    /// Trimmed description, may be empty
    pub body: String,

    /// Lifecycle status of this update
    pub update_status: String,

    /// Incident impact label
    pub impact: String,

    /// Affected component names in source order
    pub affected_components: Vec<String>,
}

impl IncidentUpdate {
    pub fn key(&self) -> UpdateKey {
        (self.incident_id.clone(), self.update_id.clone())
    }
}
