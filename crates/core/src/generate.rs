//! Text generation backend abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::GenerationError;

/// Streaming text generation backend.
///
/// Implementations return a channel of raw text deltas. Chunk boundaries
/// carry no meaning; consumers must tolerate tags and markers split
/// across deltas.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Start a streamed generation for the given prompt.
    ///
    /// The returned receiver yields text deltas in order. A transport
    /// failure mid-stream arrives as an `Err` item; the channel closing
    /// without one means the generation completed.
    async fn generate(
        &self,
        prompt: &str,
    ) -> Result<mpsc::Receiver<Result<String, GenerationError>>, GenerationError>;
}
