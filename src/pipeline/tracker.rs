// src/pipeline/tracker.rs

//! Multi-provider tracker.
//!
//! Spawns one monitor task per provider. All monitors share one HTTP client
//! (and so one connection pool) but each owns its own fetcher cache and
//! detector, so providers never see each other's state.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use super::monitor::{MonitorStats, ProviderMonitor};
use crate::error::Result;
use crate::models::Config;
use crate::output::UpdateSink;
use crate::services::StatusPageFetcher;
use crate::utils::http;

/// Outcome of a tracker run, collected after shutdown.
#[derive(Debug, Default)]
pub struct TrackerSummary {
    /// Final counters of every monitor that stopped cleanly
    pub providers: Vec<(String, MonitorStats)>,
    /// Monitors whose task ended abnormally
    pub crashed: Vec<String>,
}

impl TrackerSummary {
    pub fn updates_reported(&self) -> u64 {
        self.providers.iter().map(|(_, s)| s.updates_reported).sum()
    }
}

/// Build a monitor per configured provider on top of one shared client.
pub fn build_monitors(config: &Config, sink: Arc<dyn UpdateSink>) -> Result<Vec<ProviderMonitor>> {
    let client = http::create_async_client(&config.tracker)?;

    Ok(config
        .resolved_providers()
        .into_iter()
        .map(|provider| {
            let fetcher = Arc::new(StatusPageFetcher::new(client.clone()));
            ProviderMonitor::new(provider, fetcher, Arc::clone(&sink))
        })
        .collect())
}

/// Poll every configured provider until `shutdown` fires.
pub async fn run_tracker(
    config: &Config,
    sink: Arc<dyn UpdateSink>,
    shutdown: watch::Receiver<bool>,
) -> Result<TrackerSummary> {
    config.validate()?;
    let monitors = build_monitors(config, sink)?;
    Ok(run_monitors(monitors, shutdown).await)
}

/// Run already-built monitors concurrently, one task each.
///
/// Tasks are collected as they finish, so a monitor that dies early is
/// logged right away rather than at shutdown.
pub async fn run_monitors(
    monitors: Vec<ProviderMonitor>,
    shutdown: watch::Receiver<bool>,
) -> TrackerSummary {
    let mut running: FuturesUnordered<_> = monitors
        .into_iter()
        .map(|monitor| {
            let name = monitor.provider().name.clone();
            let handle = tokio::spawn(monitor.run(shutdown.clone()));
            async move { (name, handle.await) }
        })
        .collect();

    let mut summary = TrackerSummary::default();
    while let Some((name, result)) = running.next().await {
        match result {
            Ok(stats) => summary.providers.push((name, stats)),
            Err(e) => {
                log::error!("Monitor for {} crashed: {}", name, e);
                summary.crashed.push(name);
            }
        }
    }
    summary.providers.sort_by(|a, b| a.0.cmp(&b.0));
    summary
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{Provider, ProviderConfig};
    use crate::output::MemorySink;
    use crate::pipeline::monitor::tests::{ScriptedSource, document};
    use crate::pipeline::shutdown;
    use crate::services::{DocumentSource, FetchOutcome};

    struct PanickingSource;

    #[async_trait]
    impl DocumentSource for PanickingSource {
        async fn fetch(&self, _url: &str) -> FetchOutcome {
            panic!("source exploded");
        }
    }

    fn provider(name: &str) -> Provider {
        Provider::new(
            name,
            format!("https://{name}.example.com/incidents.json"),
            Duration::from_secs(60),
        )
    }

    fn stats_of<'a>(summary: &'a TrackerSummary, name: &str) -> &'a MonitorStats {
        summary
            .providers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stats)| stats)
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_provider_does_not_affect_others() {
        let sink = Arc::new(MemorySink::new());
        let good = Arc::new(ScriptedSource::new(vec![FetchOutcome::Document(document(
            "I1",
            &[("U1", "investigating")],
        ))]));
        let failing = Arc::new(ScriptedSource::new(vec![
            FetchOutcome::Failed,
            FetchOutcome::Failed,
        ]));

        let monitors = vec![
            ProviderMonitor::new(provider("broken"), Arc::new(PanickingSource), sink.clone()),
            ProviderMonitor::new(provider("flaky"), failing, sink.clone()),
            ProviderMonitor::new(provider("healthy"), good, sink.clone()),
        ];

        let (tx, rx) = shutdown::channel();
        let run = tokio::spawn(run_monitors(monitors, rx));
        tokio::time::sleep(Duration::from_secs(90)).await;
        tx.send(true).unwrap();

        let summary = run.await.unwrap();
        assert!(summary.crashed.is_empty());
        assert_eq!(summary.providers.len(), 3);
        assert_eq!(summary.updates_reported(), 1);

        // The panicking provider kept being polled at t=0 and t=60.
        assert_eq!(stats_of(&summary, "broken").cycles, 2);
        assert_eq!(stats_of(&summary, "broken").failures, 2);
        assert_eq!(stats_of(&summary, "flaky").failures, 2);

        let emitted = sink.take();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, "healthy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_document_reported_per_provider() {
        let sink = Arc::new(MemorySink::new());
        let d = document("I1", &[("U1", "investigating")]);
        let monitors = ["a", "b"]
            .iter()
            .map(|name| {
                let source = Arc::new(ScriptedSource::new(vec![FetchOutcome::Document(
                    d.clone(),
                )]));
                ProviderMonitor::new(provider(name), source, sink.clone())
            })
            .collect();

        let (tx, rx) = shutdown::channel();
        let run = tokio::spawn(run_monitors(monitors, rx));
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
        run.await.unwrap();

        let mut providers: Vec<String> = sink.take().into_iter().map(|(p, _)| p).collect();
        providers.sort();
        assert_eq!(providers, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_run_tracker_against_http_server() {
        let server = MockServer::start().await;
        let body = r#"{"incidents": [{"id": "I1", "name": "Outage", "impact": "major",
            "components": [{"name": "API"}],
            "incident_updates": [{"id": "U1", "status": "investigating", "body": ""}]}]}"#;
        for (p, etag) in [("/a.json", "\"a1\""), ("/b.json", "\"b1\"")] {
            Mock::given(method("GET"))
                .and(path(p))
                .and(header("If-None-Match", etag))
                .respond_with(ResponseTemplate::new(304))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("ETag", etag)
                        .set_body_string(body),
                )
                .mount(&server)
                .await;
        }

        let mut config = Config::default();
        config.tracker.poll_interval_secs = 1;
        config.providers = ["a", "b"]
            .iter()
            .map(|name| ProviderConfig {
                name: name.to_uppercase(),
                url: format!("{}/{name}.json", server.uri()),
                poll_interval_secs: None,
            })
            .collect();

        let sink = Arc::new(MemorySink::new());
        let (tx, rx) = shutdown::channel();
        let run = tokio::spawn({
            let sink: Arc<dyn UpdateSink> = sink.clone();
            async move { run_tracker(&config, sink, rx).await }
        });

        // A third request to a path means its 200 and 304 cycles are done.
        tokio::time::timeout(Duration::from_secs(15), async {
            loop {
                let requests = server.received_requests().await.unwrap();
                let done = ["/a.json", "/b.json"]
                    .iter()
                    .all(|p| requests.iter().filter(|r| r.url.path() == *p).count() >= 3);
                if done {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .expect("providers did not complete two cycles");
        tx.send(true).unwrap();
        let summary = run.await.unwrap().unwrap();

        assert!(summary.crashed.is_empty());
        for (_, stats) in &summary.providers {
            assert_eq!(stats.documents, 1);
            assert!(stats.unchanged >= 1);
        }

        let mut emitted: Vec<(String, String)> = sink
            .take()
            .into_iter()
            .map(|(p, u)| (p, u.update_id))
            .collect();
        emitted.sort();
        assert_eq!(
            emitted,
            vec![
                ("A".to_string(), "U1".to_string()),
                ("B".to_string(), "U1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_tracker_rejects_invalid_config() {
        let mut config = Config::default();
        config.providers.clear();

        let (_tx, rx) = shutdown::channel();
        let result = run_tracker(&config, Arc::new(MemorySink::new()), rx).await;
        assert!(result.is_err());
    }
}
