//! Main orchestrator for content runs.
//!
//! Fans one request out into an independent generate → validate → publish
//! task per platform and collects one [`PlatformResult`] per task. Task
//! failures are captured as results; they never abort sibling tasks or the
//! run itself.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::task::{self, JoinSet};
use tracing::{error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::adapters::{AnthropicBackend, TextBackend};
use crate::config::ResolvedConfig;
use crate::domain::{PipelineConfig, Platform, PlatformResult, RunReport};

use super::generation::{GenerationClient, SystemPrompt};
use super::registry::PublisherRegistry;
use super::validator::ContentValidator;

/// Reason recorded for a platform whose task panicked
pub const TASK_ABORTED: &str = "pipeline task aborted before producing a result";

/// Main content orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    generator: Arc<GenerationClient>,
    validator: Arc<ContentValidator>,
    registry: Arc<PublisherRegistry>,
}

impl Orchestrator {
    /// Create an orchestrator from its three collaborators
    pub fn new(
        generator: Arc<GenerationClient>,
        validator: ContentValidator,
        registry: Arc<PublisherRegistry>,
    ) -> Self {
        Self {
            generator,
            validator: Arc::new(validator),
            registry,
        }
    }

    /// Wire the Anthropic backend and configured publishers
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let anthropic = config
            .generation
            .anthropic()
            .context("ANTHROPIC_API_KEY is not set (env or config file)")?;
        let system_prompt = SystemPrompt::load(&config.generation.system_prompt)?;

        let backend: Arc<dyn TextBackend> = Arc::new(AnthropicBackend::new(anthropic));
        let generator = GenerationClient::new(backend, system_prompt);

        Ok(Self::new(
            Arc::new(generator),
            config.validation.clone(),
            Arc::new(PublisherRegistry::from_config(&config.publishers)),
        ))
    }

    pub fn registry(&self) -> &PublisherRegistry {
        &self.registry
    }

    /// Run every supported platform to completion
    pub async fn run(&self, config: &PipelineConfig) -> Result<RunReport> {
        self.run_until(config, std::future::pending::<()>()).await
    }

    /// Run until every task finishes or `shutdown` resolves.
    ///
    /// On shutdown, in-flight tasks are aborted (no further retries or
    /// publishes) and the report holds only the results that had completed.
    #[instrument(skip(self, config, shutdown), fields(pillar = %config.pillar, dry_run = config.dry_run))]
    pub async fn run_until<F>(&self, config: &PipelineConfig, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        config.validate().context("Invalid pipeline configuration")?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let platforms = config.supported_platforms();

        let unsupported = config.unsupported_platforms();
        if !unsupported.is_empty() {
            warn!(?unsupported, "Ignoring unsupported platforms");
        }
        info!(%run_id, ?platforms, "Starting content run");

        let pillar: Arc<str> = Arc::from(config.pillar.as_str());
        let mut tasks = JoinSet::new();
        let mut task_platforms: HashMap<task::Id, Platform> = HashMap::new();
        for &platform in &platforms {
            let this = self.clone();
            let pillar = Arc::clone(&pillar);
            let dry_run = config.dry_run;
            let handle = tasks.spawn(
                async move { this.run_platform(platform, &pillar, dry_run).await }
                    .instrument(info_span!("platform", %platform)),
            );
            task_platforms.insert(handle.id(), platform);
        }

        let mut results: BTreeMap<Platform, PlatformResult> = BTreeMap::new();
        let mut cancelled = false;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;

                joined = tasks.join_next_with_id() => match joined {
                    Some(Ok((_, result))) => {
                        results.insert(result.platform, result);
                    }
                    Some(Err(e)) => {
                        // Only a panicked task lands here; cancellation exits the loop first
                        let Some(&platform) = task_platforms.get(&e.id()) else {
                            error!(error = %e, "Unknown platform task failed");
                            continue;
                        };
                        error!(%platform, error = %e, "Platform task aborted");
                        results.insert(
                            platform,
                            PlatformResult::publish_failed(platform, TASK_ABORTED),
                        );
                    }
                    None => break,
                },
                _ = &mut shutdown => {
                    warn!(completed = results.len(), "Run cancelled, aborting in-flight tasks");
                    tasks.abort_all();
                    cancelled = true;
                    break;
                }
            }
        }

        let report = RunReport {
            run_id,
            pillar: config.pillar.clone(),
            dry_run: config.dry_run,
            started_at,
            completed_at: Utc::now(),
            cancelled,
            results,
        };

        info!(
            %run_id,
            published = report.published().len(),
            failed = report.failed().len(),
            cancelled,
            "Content run finished"
        );

        Ok(report)
    }

    /// One platform's pipeline: generate, validate, then publish or skip
    async fn run_platform(&self, platform: Platform, pillar: &str, dry_run: bool) -> PlatformResult {
        let content = match self.generator.generate(pillar, platform).await {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "Generation failed");
                return PlatformResult::generation_failed(platform, e.to_string());
            }
        };

        let validation = self.validator.validate(&content, platform);
        if !validation.passed {
            warn!(failures = ?validation.failures, "Validation rejected content");
            return PlatformResult::rejected(platform, validation.failures);
        }

        if dry_run {
            info!("Dry run, skipping publish");
            return PlatformResult::dry_run(platform);
        }

        let Some(publisher) = self.registry.get(platform) else {
            error!("No publisher registered");
            return PlatformResult::publish_failed(
                platform,
                format!("no publisher registered for {}", platform),
            );
        };

        match publisher.publish(&content).await {
            Ok(status) => {
                info!(%status, "Published");
                PlatformResult::published(platform, status)
            }
            Err(e) => {
                error!(error = %e, "Publish failed");
                PlatformResult::publish_failed(platform, e.to_string())
            }
        }
    }
}
