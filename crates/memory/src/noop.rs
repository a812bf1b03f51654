//! No-op knowledge store. Disables retrieval entirely.

use async_trait::async_trait;
use groundrag_core::error::MemoryError;
use groundrag_core::memory::{VectorQueryResponse, VectorStore};

/// A knowledge store that never returns documents.
pub struct NoopVectorStore;

#[async_trait]
impl VectorStore for NoopVectorStore {
    fn name(&self) -> &str { "none" }

    async fn query(
        &self,
        _query_string: &str,
        _return_n: usize,
    ) -> Result<VectorQueryResponse, MemoryError> {
        Ok(VectorQueryResponse::default())
    }
}
