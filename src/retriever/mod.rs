mod filter;

pub use filter::FilteringRetriever;

use anyhow::Result;
use async_trait::async_trait;

use crate::context::AccessContext;
use crate::types::document::ScoredDocument;

/// Capability of retrieving scored documents for a query.
///
/// The caller identity travels explicitly with the call instead of through
/// ambient task-local state, so a missing identity is visible at the seam and
/// the trait is testable without global setup. Implementations return
/// documents in relevance order.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        ctx: Option<&AccessContext>,
    ) -> Result<Vec<ScoredDocument>>;
}
