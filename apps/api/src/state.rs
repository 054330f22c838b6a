use std::sync::Arc;

use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::ingest::SourceExtractor;
use crate::llm_client::CompletionService;
use crate::models::ResumeDocument;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion service. `LlmClient` in production, scripted doubles in tests.
    pub llm: Arc<dyn CompletionService>,
    pub extractor: Arc<dyn SourceExtractor>,
    pub config: Config,
    /// Guidance reports keyed by `analyze:` fingerprints.
    pub analysis_cache: Arc<ExpiringCache<String>>,
    /// Decoded, unverified documents keyed by `enhance:` fingerprints.
    pub document_cache: Arc<ExpiringCache<Arc<ResumeDocument>>>,
}

impl AppState {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        extractor: Arc<dyn SourceExtractor>,
        config: Config,
    ) -> Self {
        let (capacity, ttl) = (config.cache_max_entries, config.cache_ttl);
        Self {
            llm,
            extractor,
            analysis_cache: Arc::new(ExpiringCache::new(capacity, ttl)),
            document_cache: Arc::new(ExpiringCache::new(capacity, ttl)),
            config,
        }
    }
}
