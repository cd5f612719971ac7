//! The `assessify build` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use assessify_clients::{load_config_from, KnowledgeClient, MemoryCache};
use assessify_core::engine::{EngineConfig, EvidenceEngine};
use assessify_core::model::SolutionInfo;

pub async fn execute(
    reference_id: String,
    solution_type: String,
    skip_page_questions: bool,
    config_path: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    info!(
        base_url = %config.knowledge_base_url,
        reference_id,
        "building evidence bundle"
    );

    let fetcher = Arc::new(KnowledgeClient::with_timeout(
        &config.knowledge_base_url,
        config.auth_token.clone(),
        config.request_timeout_secs,
    ));
    let cache = Arc::new(MemoryCache::with_capacity(config.cache_capacity));
    let engine = EvidenceEngine::new(
        fetcher,
        cache,
        EngineConfig {
            cache_ttl_secs: config.cache_ttl_secs,
        },
    );

    let solution = SolutionInfo {
        kind: solution_type,
    };
    let response = engine
        .build_response(&reference_id, &solution, !skip_page_questions)
        .await;

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");

    if !response.success {
        anyhow::bail!("evidence build failed: {}", response.message);
    }
    Ok(())
}
