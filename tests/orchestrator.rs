//! Orchestrator Integration Tests
//!
//! Runs full content requests against in-memory backends and publishers.
//! Covers platform filtering, dry runs, failure isolation, concurrency and
//! cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use pillarpost::adapters::{BackendError, PublishError, Publisher, TextBackend};
use pillarpost::{
    ContentValidator, GenerationClient, Orchestrator, PipelineConfig, Platform, PlatformOutcome,
    PlatformResult, PublisherRegistry, SystemPrompt,
};
use pillarpost::core::TASK_ABORTED;

const GOOD_POST: &str = "Profiling before optimising saved our iOS team two sprints of guesswork.";

/// Backend that answers per platform, keyed by the id in the instruction
struct PerPlatformBackend {
    responses: HashMap<&'static str, Result<String, BackendError>>,
    delay: Duration,
}

impl PerPlatformBackend {
    fn uniform(text: &str) -> Self {
        let responses = Platform::ALL
            .iter()
            .map(|p| (p.as_str(), Ok(text.to_string())))
            .collect();
        Self {
            responses,
            delay: Duration::ZERO,
        }
    }

    fn respond(mut self, platform: Platform, response: Result<String, BackendError>) -> Self {
        self.responses.insert(platform.as_str(), response);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl TextBackend for PerPlatformBackend {
    fn name(&self) -> &str {
        "per-platform"
    }

    async fn complete(&self, _system: &str, user: &str) -> Result<String, BackendError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .iter()
            .find(|(id, _)| user.starts_with(&format!("Write a {} post", id)))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(BackendError::InvalidResponse("unknown platform".into())))
    }
}

/// Publisher that counts calls and returns a canned outcome
struct CountingPublisher {
    platform: Platform,
    calls: AtomicUsize,
    fail_with: Option<String>,
    delay: Duration,
    received: Mutex<Vec<String>>,
}

impl CountingPublisher {
    fn new(platform: Platform) -> Arc<Self> {
        Arc::new(Self::plain(platform))
    }

    fn failing(platform: Platform, message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.to_string()),
            ..Self::plain(platform)
        })
    }

    fn slow(platform: Platform, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::plain(platform)
        })
    }

    fn plain(platform: Platform) -> Self {
        Self {
            platform,
            calls: AtomicUsize::new(0),
            fail_with: None,
            delay: Duration::ZERO,
            received: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for CountingPublisher {
    fn name(&self) -> &str {
        "counting"
    }

    async fn publish(&self, content: &str) -> Result<String, PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(content.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(PublishError::new(self.platform, message.clone())),
            None => Ok(format!(
                "{}: published successfully → test-{}",
                self.platform.display_name(),
                self.platform
            )),
        }
    }
}

/// Publisher whose task dies mid-publish
struct PanickingPublisher;

#[async_trait]
impl Publisher for PanickingPublisher {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn publish(&self, _content: &str) -> Result<String, PublishError> {
        panic!("publisher crashed");
    }
}

fn orchestrator(backend: PerPlatformBackend, registry: PublisherRegistry) -> Orchestrator {
    let generator = GenerationClient::new(Arc::new(backend), SystemPrompt::new("system"));
    Orchestrator::new(Arc::new(generator), ContentValidator::default(), Arc::new(registry))
}

#[tokio::test]
async fn test_dry_run_filters_unsupported_and_never_publishes() {
    let x = CountingPublisher::new(Platform::X);
    let linkedin = CountingPublisher::new(Platform::LinkedIn);
    let registry = PublisherRegistry::new()
        .with(Platform::X, x.clone())
        .with(Platform::LinkedIn, linkedin.clone());

    let config = PipelineConfig::new(["x", "linkedin", "bogus"], "career_mentorship", true);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run(&config)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(
        report.results.keys().copied().collect::<Vec<_>>(),
        vec![Platform::LinkedIn, Platform::X]
    );
    assert_eq!(
        report.get(Platform::X),
        Some(&PlatformResult::dry_run(Platform::X))
    );
    match &report.get(Platform::LinkedIn).unwrap().outcome {
        PlatformOutcome::DryRunSkipped { status } => {
            assert_eq!(status, "[DRY RUN] Would publish to linkedin");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(x.calls(), 0);
    assert_eq!(linkedin.calls(), 0);
    assert!(report.is_success());
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_only_unsupported_platforms_yields_empty_report() {
    let config = PipelineConfig::new(["myspace", "X"], "ios_swift", true);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), PublisherRegistry::new())
        .run(&config)
        .await
        .unwrap();

    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_duplicate_platforms_run_once() {
    let x = CountingPublisher::new(Platform::X);
    let registry = PublisherRegistry::new().with(Platform::X, x.clone());

    let config = PipelineConfig::new(["x", "x"], "ios_swift", false);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run(&config)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(x.calls(), 1);
}

#[tokio::test]
async fn test_live_run_passes_publisher_status_through() {
    let x = CountingPublisher::new(Platform::X);
    let registry = PublisherRegistry::new().with(Platform::X, x.clone());

    let config = PipelineConfig::new(["x"], "ios_swift", false);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run(&config)
        .await
        .unwrap();

    assert_eq!(
        report.get(Platform::X),
        Some(&PlatformResult::published(
            Platform::X,
            "X: published successfully → test-x"
        ))
    );
    assert_eq!(x.received.lock().unwrap().as_slice(), [GOOD_POST.to_string()]);
}

#[tokio::test]
async fn test_failures_are_isolated_per_platform() {
    let x = CountingPublisher::new(Platform::X);
    let medium = CountingPublisher::failing(Platform::Medium, "HTTP 401: unauthorized");
    let linkedin = CountingPublisher::new(Platform::LinkedIn);
    let registry = PublisherRegistry::new()
        .with(Platform::X, x.clone())
        .with(Platform::Medium, medium.clone())
        .with(Platform::LinkedIn, linkedin.clone());

    let backend = PerPlatformBackend::uniform(GOOD_POST).respond(
        Platform::LinkedIn,
        Err(BackendError::InvalidResponse("empty completion".to_string())),
    );

    let config = PipelineConfig::new(["linkedin", "medium", "x"], "ai_mobile", false);
    let report = orchestrator(backend, registry).run(&config).await.unwrap();

    assert_eq!(report.results.len(), 3);
    assert!(matches!(
        report.get(Platform::X).unwrap().outcome,
        PlatformOutcome::Published { .. }
    ));
    assert_eq!(
        report.get(Platform::Medium),
        Some(&PlatformResult::publish_failed(
            Platform::Medium,
            "Medium publish failed: HTTP 401: unauthorized"
        ))
    );
    assert_eq!(
        report.get(Platform::LinkedIn),
        Some(&PlatformResult::generation_failed(
            Platform::LinkedIn,
            "Unretryable generation failure: empty completion"
        ))
    );

    assert_eq!(linkedin.calls(), 0);
    assert_eq!(report.published(), vec![Platform::X]);
    assert_eq!(report.failed(), vec![Platform::LinkedIn, Platform::Medium]);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_rejected_content_is_never_published() {
    let x = CountingPublisher::new(Platform::X);
    let medium = CountingPublisher::new(Platform::Medium);
    let registry = PublisherRegistry::new()
        .with(Platform::X, x.clone())
        .with(Platform::Medium, medium.clone());

    // Fits Medium's limit but not X's
    let long_post = format!("{} ", GOOD_POST).repeat(5);
    let config = PipelineConfig::new(["x", "medium"], "ios_swift", false);
    let report = orchestrator(PerPlatformBackend::uniform(&long_post), registry)
        .run(&config)
        .await
        .unwrap();

    match &report.get(Platform::X).unwrap().outcome {
        PlatformOutcome::ValidationRejected { reasons } => {
            assert_eq!(reasons.len(), 1);
            assert!(reasons[0].starts_with("Content exceeds x limit"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(x.calls(), 0);
    assert_eq!(medium.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_platforms_run_concurrently() {
    let delay = Duration::from_secs(10);
    let registry = Platform::ALL
        .iter()
        .fold(PublisherRegistry::new(), |registry, &platform| {
            registry.with(platform, CountingPublisher::slow(platform, delay))
        });
    let backend = PerPlatformBackend::uniform(GOOD_POST).with_delay(delay);

    let start = Instant::now();
    let config = PipelineConfig::new(["linkedin", "medium", "x"], "ios_swift", false);
    let report = orchestrator(backend, registry).run(&config).await.unwrap();

    assert_eq!(report.published().len(), 3);
    // Sequential would take 60s; concurrent tasks overlap completely
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_returns_partial_report() {
    let x = CountingPublisher::new(Platform::X);
    let medium = CountingPublisher::slow(Platform::Medium, Duration::from_secs(60));
    let registry = PublisherRegistry::new()
        .with(Platform::X, x.clone())
        .with(Platform::Medium, medium.clone());

    let config = PipelineConfig::new(["x", "medium"], "ios_swift", false);
    let shutdown = tokio::time::sleep(Duration::from_secs(5));
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run_until(&config, shutdown)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.results.len(), 1);
    assert!(matches!(
        report.get(Platform::X).unwrap().outcome,
        PlatformOutcome::Published { .. }
    ));
    assert!(report.get(Platform::Medium).is_none());
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_panicked_task_reported_without_affecting_siblings() {
    let medium = CountingPublisher::new(Platform::Medium);
    let linkedin = CountingPublisher::failing(Platform::LinkedIn, "HTTP 403: forbidden");
    let registry = PublisherRegistry::new()
        .with(Platform::X, Arc::new(PanickingPublisher))
        .with(Platform::Medium, medium.clone())
        .with(Platform::LinkedIn, linkedin.clone());

    let config = PipelineConfig::new(["x", "medium", "linkedin"], "ios_swift", false);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run(&config)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(
        report.get(Platform::X),
        Some(&PlatformResult::publish_failed(Platform::X, TASK_ABORTED))
    );
    assert_eq!(
        report.get(Platform::Medium),
        Some(&PlatformResult::published(
            Platform::Medium,
            "Medium: published successfully → test-medium"
        ))
    );
    assert_eq!(
        report.get(Platform::LinkedIn),
        Some(&PlatformResult::publish_failed(
            Platform::LinkedIn,
            "LinkedIn publish failed: HTTP 403: forbidden"
        ))
    );
    assert!(!report.cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_after_panic_omits_unfinished_platforms() {
    let medium = CountingPublisher::slow(Platform::Medium, Duration::from_secs(60));
    let registry = PublisherRegistry::new()
        .with(Platform::X, Arc::new(PanickingPublisher))
        .with(Platform::Medium, medium.clone());

    let config = PipelineConfig::new(["x", "medium"], "ios_swift", false);
    let shutdown = tokio::time::sleep(Duration::from_secs(5));
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), registry)
        .run_until(&config, shutdown)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.results.len(), 1);
    assert_eq!(
        report.get(Platform::X),
        Some(&PlatformResult::publish_failed(Platform::X, TASK_ABORTED))
    );
    assert!(report.get(Platform::Medium).is_none());
    assert_eq!(medium.calls(), 1);
}

#[tokio::test]
async fn test_report_serializes_with_status_tags() {
    let config = PipelineConfig::new(["x"], "ios_swift", true);
    let report = orchestrator(PerPlatformBackend::uniform(GOOD_POST), PublisherRegistry::new())
        .run(&config)
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pillar"], "ios_swift");
    assert_eq!(json["results"]["x"]["outcome"], "dry_run_skipped");
    assert_eq!(json["results"]["x"]["status"], "[DRY RUN] Would publish to x");
}
