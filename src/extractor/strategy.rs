use async_trait::async_trait;

use super::types::ExtractionResult;

/// A fetched share page handed to each strategy in turn
#[derive(Debug, Clone)]
pub struct SharePage {
    pub url: String,
    pub html: String,
}

/// One way of recovering a file manifest from a share page.
///
/// `None` means "not applicable here, try the next strategy". Parse
/// failures stay inside the strategy; nothing is propagated.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, page: &SharePage) -> Option<ExtractionResult>;
}
