//! Optional per-call timeouts around external capabilities.

use std::time::Duration;

use groundrag_core::error::{MemoryError, ProviderError};
use groundrag_core::memory::{VectorQueryResponse, VectorStore};
use groundrag_core::message::Message;
use groundrag_core::{Result, TextGenerator};

/// Run a generator, failing with `ProviderError::Timeout` past `limit`.
pub(crate) async fn generate(
    generator: &dyn TextGenerator,
    query: &str,
    context: Option<&[Message]>,
    limit: Option<Duration>,
) -> Result<Vec<Message>> {
    let call = generator.run(query, context);
    let replies = match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(format!("no reply within {limit:?}")))??,
        None => call.await?,
    };
    Ok(replies)
}

/// Query a knowledge store, failing with `MemoryError::Timeout` past `limit`.
pub(crate) async fn query_store(
    store: &dyn VectorStore,
    query: &str,
    return_n: usize,
    limit: Option<Duration>,
) -> Result<VectorQueryResponse> {
    let call = store.query(query, return_n);
    let response = match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| MemoryError::Timeout(format!("{} gave no result within {limit:?}", store.name())))??,
        None => call.await?,
    };
    Ok(response)
}
