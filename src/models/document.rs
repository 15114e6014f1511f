//! Wire shape of a status page incidents payload.
//!
//! Every field is optional: entries missing an id, a name or a status still
//! deserialize, and the detector fills in placeholders. `null` is treated
//! the same as an absent field. Unknown fields are ignored.
//!
//! Parsing is lenient below the top level. A numeric id is kept as its
//! decimal text, any other non-string scalar reads as absent, and list
//! elements that are not objects are dropped, so one bad entry never hides
//! the rest of the document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level `incidents.json` document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IncidentsDocument {
    #[serde(default, deserialize_with = "lenient_list")]
    pub incidents: Vec<IncidentEntry>,
}

/// One incident with its update history.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IncidentEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    /// Severity label (none / minor / major / critical, open-ended)
    #[serde(default, deserialize_with = "lenient_string")]
    pub impact: Option<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub components: Vec<ComponentEntry>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub incident_updates: Vec<UpdateEntry>,
}

/// A component affected by an incident.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ComponentEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// One entry of an incident's history.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UpdateEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,

    /// Lifecycle status (investigating / identified / monitoring / resolved, open-ended)
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

impl IncidentsDocument {
    /// Parse a response body.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| T::deserialize(item).ok())
        .collect())
}
