use async_trait::async_trait;

use super::error::ConversionError;
use super::http::ConversionClient;
use super::models::ResolvedDownload;

/// Anything that can turn a source URL into a resolved download.
///
/// `ConversionSession` drives its state machine through this trait so the
/// presentation layer can be exercised without a live backend.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Perform one conversion attempt; never retries
    async fn convert(&self, source_url: &str) -> Result<ResolvedDownload, ConversionError>;
}

#[async_trait]
impl Converter for ConversionClient {
    async fn convert(&self, source_url: &str) -> Result<ResolvedDownload, ConversionError> {
        ConversionClient::convert(self, source_url).await
    }
}
