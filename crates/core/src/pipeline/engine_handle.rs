use std::sync::{Arc, Mutex};

use crate::shared::config::EngineConfig;

use super::engine::EmotionEngine;
use super::engine_factory::{create_engine, EngineError};

type EngineBuilder =
    Box<dyn Fn(&EngineConfig) -> Result<Arc<dyn EmotionEngine>, EngineError> + Send + Sync>;

/// Process-wide engine, built on first use and shared read-only afterwards.
///
/// Concurrent first callers block until the single build finishes. A failed
/// build is not cached, so a later call retries.
pub struct EngineHandle {
    config: EngineConfig,
    builder: EngineBuilder,
    engine: Mutex<Option<Arc<dyn EmotionEngine>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_builder(config, create_engine)
    }

    pub fn with_builder<F>(config: EngineConfig, builder: F) -> Self
    where
        F: Fn(&EngineConfig) -> Result<Arc<dyn EmotionEngine>, EngineError> + Send + Sync + 'static,
    {
        Self {
            config,
            builder: Box::new(builder),
            engine: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get(&self) -> Result<Arc<dyn EmotionEngine>, EngineError> {
        let mut slot = self.engine.lock().map_err(|_| EngineError::Poisoned)?;
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }
        let engine = (self.builder)(&self.config)?;
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::channel_resolver::ChannelResolver;
    use crate::emotion::domain::alerts::AlertDetector;
    use crate::pipeline::fallback_pipeline::FallbackPipeline;
    use crate::shared::config::{ConfigError, FallbackStrategy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn counting_handle(builds: Arc<AtomicUsize>) -> EngineHandle {
        EngineHandle::with_builder(EngineConfig::default(), move |config| {
            builds.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(FallbackPipeline::new(
                ChannelResolver::new(Vec::new()),
                FallbackStrategy::Heuristic,
                AlertDetector::default(),
                config.language.clone(),
            )) as Arc<dyn EmotionEngine>)
        })
    }

    #[test]
    fn test_concurrent_first_callers_build_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(counting_handle(builds.clone()));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || handle.get().map(|_| ()).is_ok())
            })
            .collect();
        for t in threads {
            assert!(t.join().unwrap());
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(handle.is_initialized());
    }

    #[test]
    fn test_same_engine_is_returned() {
        let handle = counting_handle(Arc::new(AtomicUsize::new(0)));
        let a = handle.get().unwrap();
        let b = handle.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_failed_build_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let handle = EngineHandle::with_builder(EngineConfig::default(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::Config(ConfigError::Invalid("broken".into())))
        });
        assert!(handle.get().is_err());
        assert!(handle.get().is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(!handle.is_initialized());
    }
}
