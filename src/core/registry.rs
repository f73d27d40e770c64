//! Platform → publisher lookup.
//!
//! Adapters are registered once at startup and shared across runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::{
    LinkedInPublisher, MediumPublisher, Publisher, TwitterPublisher,
};
use crate::config::PublishersConfig;
use crate::domain::Platform;

/// Registered publishing adapters, keyed by platform
#[derive(Default, Clone)]
pub struct PublisherRegistry {
    publishers: BTreeMap<Platform, Arc<dyn Publisher>>,
}

impl PublisherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every adapter whose credentials are configured
    pub fn from_config(config: &PublishersConfig) -> Self {
        let mut registry = Self::new();

        if let Some(ref x) = config.x {
            registry.register(
                Platform::X,
                Arc::new(TwitterPublisher::new(x.clone())),
            );
        }
        if let Some(ref medium) = config.medium {
            registry.register(Platform::Medium, Arc::new(MediumPublisher::new(medium.clone())));
        }
        if let Some(ref linkedin) = config.linkedin {
            registry.register(
                Platform::LinkedIn,
                Arc::new(LinkedInPublisher::new(linkedin.clone())),
            );
        }

        info!(platforms = ?registry.platforms(), "Publisher registry initialised");
        registry
    }

    /// Register (or replace) the publisher for a platform
    pub fn register(&mut self, platform: Platform, publisher: Arc<dyn Publisher>) {
        debug!(%platform, adapter = publisher.name(), "Registering publisher");
        self.publishers.insert(platform, publisher);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, platform: Platform, publisher: Arc<dyn Publisher>) -> Self {
        self.register(platform, publisher);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Publisher>> {
        self.publishers.get(&platform).cloned()
    }

    pub fn contains(&self, platform: Platform) -> bool {
        self.publishers.contains_key(&platform)
    }

    /// Platforms with a registered publisher
    pub fn platforms(&self) -> Vec<Platform> {
        self.publishers.keys().copied().collect()
    }
}
