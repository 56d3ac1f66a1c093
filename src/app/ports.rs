use async_trait::async_trait;

use score_core::ConversionResult;

/// Where converted scores go. Persistence lives behind this port.
#[async_trait]
pub trait ConvertOutputPort: Send + Sync {
    async fn write_conversion(&self, index: usize, result: &ConversionResult) -> anyhow::Result<()>;
}

/// Discards results; for callers that only want the batch report
pub struct NullOutput;

#[async_trait]
impl ConvertOutputPort for NullOutput {
    async fn write_conversion(&self, _index: usize, _result: &ConversionResult) -> anyhow::Result<()> {
        Ok(())
    }
}
