//! Lookup of strategies by source name.

use super::{
    BatchStrategy, FixedIntervalThrottle, OnerequestStrategy, OnesidStrategy,
    SpreadsheetStrategy, TaskItemPipeline,
};
use crate::batch::domain::TaskSource;
use crate::catalog::ports::CatalogLookup;
use crate::config::{BatchConfig, ConfigError};
use crate::remote::ports::RemoteSystem;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;

/// Strategies keyed by the source they handle.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<TaskSource, Arc<dyn BatchStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the three standard strategies over a shared pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the batch settings are unusable.
    pub fn standard<C>(
        remote: Arc<dyn RemoteSystem>,
        catalog: Arc<dyn CatalogLookup>,
        settings: BatchConfig,
        clock: Arc<C>,
    ) -> Result<Self, ConfigError>
    where
        C: Clock + Send + Sync + 'static,
    {
        let throttle = Arc::new(FixedIntervalThrottle::new(settings.item_interval()));
        let pipeline = TaskItemPipeline::new(remote, catalog, throttle);
        Ok(Self::new()
            .with(Arc::new(OnesidStrategy::new(
                pipeline.clone(),
                settings,
                Arc::clone(&clock),
            )))
            .with(Arc::new(OnerequestStrategy::new(
                pipeline.clone(),
                settings,
                Arc::clone(&clock),
            )?))
            .with(Arc::new(SpreadsheetStrategy::new(pipeline, settings, clock)?)))
    }

    /// Registers `strategy` for its source, returning the one it replaces.
    pub fn register(
        &mut self,
        strategy: Arc<dyn BatchStrategy>,
    ) -> Option<Arc<dyn BatchStrategy>> {
        self.strategies.insert(strategy.source(), strategy)
    }

    /// Registers `strategy` and returns the registry.
    #[must_use]
    pub fn with(mut self, strategy: Arc<dyn BatchStrategy>) -> Self {
        self.register(strategy);
        self
    }

    /// Returns the strategy for a source name, matched case-insensitively.
    #[must_use]
    pub fn resolve(&self, source_name: &str) -> Option<Arc<dyn BatchStrategy>> {
        let source = TaskSource::try_from(source_name).ok()?;
        self.strategies.get(&source).cloned()
    }
}
