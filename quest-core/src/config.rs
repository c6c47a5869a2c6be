//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use inference::GenerationOptions;

const DEFAULT_SHORT_MEMORY_SIZE: usize = 5;
const DEFAULT_REMIND_LIMIT: usize = 5;
const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many recent turns the short-term buffer retains.
    pub short_memory_size: usize,
    /// Directory the long-term store persists under.
    pub store_dir: PathBuf,
    /// How many long-term items each recall query pulls back.
    pub remind_limit: usize,
    /// Upper bound on any single provider call.
    pub provider_timeout: Duration,
    /// Sampling options forwarded to the generative model.
    pub generation: GenerationOptions,
}

impl EngineConfig {
    /// Defaults with the store rooted at `store_dir`.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            short_memory_size: DEFAULT_SHORT_MEMORY_SIZE,
            store_dir: store_dir.into(),
            remind_limit: DEFAULT_REMIND_LIMIT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            generation: GenerationOptions::default(),
        }
    }

    pub fn with_short_memory_size(mut self, size: usize) -> Self {
        self.short_memory_size = size;
        self
    }

    pub fn with_remind_limit(mut self, limit: usize) -> Self {
        self.remind_limit = limit;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new("/tmp/campaign");
        assert_eq!(config.short_memory_size, 5);
        assert_eq!(config.remind_limit, 5);
        assert_eq!(config.provider_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new("/tmp/campaign")
            .with_short_memory_size(3)
            .with_remind_limit(2)
            .with_provider_timeout(Duration::from_secs(5));
        assert_eq!(config.short_memory_size, 3);
        assert_eq!(config.remind_limit, 2);
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
    }
}
