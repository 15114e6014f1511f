//! Stdout sink with text and JSON-lines rendering.

use std::fmt::Display;
use std::io::Write;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use super::UpdateSink;
use crate::error::Result;
use crate::models::{IncidentUpdate, OutputFormat};

const SEPARATOR_WIDTH: usize = 60;

/// Writes each update to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn render(&self, provider: &str, update: &IncidentUpdate) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(render_text(provider, update, &Local)),
            OutputFormat::Json => render_json(provider, update),
        }
    }
}

impl UpdateSink for ConsoleSink {
    fn emit(&self, provider: &str, update: &IncidentUpdate) {
        let line = match self.render(provider, update) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to render update {}: {}", update.update_id, e);
                return;
            }
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
            log::warn!("Failed to write update to stdout: {}", e);
        }
    }
}

/// Render an update as a human-readable block, timestamps shown in `tz`.
pub fn render_text<Tz>(provider: &str, update: &IncidentUpdate, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let product = if update.affected_components.is_empty() {
        format!("{provider} API")
    } else {
        update.affected_components.join(", ")
    };

    // Providers often leave the body empty; fall back to the structured fields.
    let status = if update.body.is_empty() {
        format!(
            "{} (impact: {})",
            capitalize(&update.update_status),
            update.impact
        )
    } else {
        update.body.clone()
    };

    format!(
        "\n[{}]\nProvider : {}\nIncident : {}\nProduct  : {}\nStatus   : {}\n{}",
        display_timestamp(&update.created_at, tz),
        provider,
        update.incident_name,
        product,
        status,
        "-".repeat(SEPARATOR_WIDTH)
    )
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    provider: &'a str,
    #[serde(flatten)]
    update: &'a IncidentUpdate,
}

/// Render an update as a single JSON object.
pub fn render_json(provider: &str, update: &IncidentUpdate) -> Result<String> {
    Ok(serde_json::to_string(&JsonRecord { provider, update })?)
}

fn display_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) if raw.is_empty() => "N/A".to_string(),
        Err(_) => raw.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn sample_update() -> IncidentUpdate {
        IncidentUpdate {
            incident_id: "I1".to_string(),
            incident_name: "Elevated error rates".to_string(),
            update_id: "U1".to_string(),
            created_at: "2024-05-01T10:00:00.000Z".to_string(),
            body: String::new(),
            update_status: "investigating".to_string(),
            impact: "major".to_string(),
            affected_components: vec!["API".to_string(), "ChatGPT".to_string()],
        }
    }

    #[test]
    fn test_render_text_with_components() {
        let text = render_text("OpenAI", &sample_update(), &Utc);
        let separator = "-".repeat(60);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "",
                "[2024-05-01 10:00:00]",
                "Provider : OpenAI",
                "Incident : Elevated error rates",
                "Product  : API, ChatGPT",
                "Status   : Investigating (impact: major)",
                separator.as_str(),
            ]
        );
    }

    #[test]
    fn test_render_text_prefers_body() {
        let mut update = sample_update();
        update.body = "We are looking into it.".to_string();
        update.affected_components.clear();

        let text = render_text("Stripe", &update, &Utc);
        assert!(text.contains("Product  : Stripe API\n"));
        assert!(text.contains("Status   : We are looking into it.\n"));
    }

    #[test]
    fn test_timestamp_converted_to_zone() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let text = render_text("OpenAI", &sample_update(), &kst);
        assert!(text.starts_with("\n[2024-05-01 19:00:00]\n"));
    }

    #[test]
    fn test_timestamp_fallbacks() {
        assert_eq!(display_timestamp("", &Utc), "N/A");
        assert_eq!(display_timestamp("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("investigating"), "Investigating");
        assert_eq!(capitalize("MONITORING"), "Monitoring");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_json() {
        let json = render_json("OpenAI", &sample_update()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["provider"], "OpenAI");
        assert_eq!(value["update_id"], "U1");
        assert_eq!(value["affected_components"][1], "ChatGPT");
        assert!(!json.contains('\n'));
    }
}
