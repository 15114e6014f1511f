// src/services/detector.rs

//! Change detection for incident updates.
//!
//! Status page documents are append-only: each poll returns the recent
//! incidents with their full update history. The detector remembers which
//! `(incident_id, update_id)` pairs it has already returned and hands back
//! only the rest, in document order.

use std::collections::HashSet;

use crate::models::{IncidentUpdate, IncidentsDocument, UpdateKey};

const UNKNOWN_INCIDENT: &str = "Unknown incident";
const UNKNOWN: &str = "unknown";

/// Stateful detector owned by a single provider.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    seen: HashSet<UpdateKey>,
}

impl ChangeDetector {
    /// Create a detector with an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the updates in `document` not returned before and remember them.
    pub fn find_new_updates(&mut self, document: &IncidentsDocument) -> Vec<IncidentUpdate> {
        let mut new_updates = Vec::new();

        for incident in &document.incidents {
            let incident_id = incident.id.clone().unwrap_or_default();
            let incident_name = incident
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_INCIDENT.to_string());
            let impact = incident
                .impact
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string());

            let affected: Vec<String> = incident
                .components
                .iter()
                .filter_map(|c| c.name.as_deref())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();

            for update in &incident.incident_updates {
                let update_id = update.id.clone().unwrap_or_default();

                if !self.seen.insert((incident_id.clone(), update_id.clone())) {
                    continue;
                }

                new_updates.push(IncidentUpdate {
                    incident_id: incident_id.clone(),
                    incident_name: incident_name.clone(),
                    update_id,
                    created_at: update.created_at.clone().unwrap_or_default(),
                    body: update
                        .body
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                    update_status: update
                        .status
                        .clone()
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    impact: impact.clone(),
                    affected_components: affected.clone(),
                });
            }
        }

        new_updates
    }

    /// Whether the update has already been returned.
    pub fn has_seen(&self, incident_id: &str, update_id: &str) -> bool {
        self.seen
            .contains(&(incident_id.to_string(), update_id.to_string()))
    }

    /// Number of remembered updates.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
