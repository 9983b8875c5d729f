// Speech generation
// The provider seam, its response model, and cancellation of in-flight requests

pub mod response;

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

pub use response::{InlineData, SpeechResponse};

use crate::error::GenerationError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

/// A remote text-to-speech service.
pub trait SpeechProvider {
    fn synthesize(
        &self,
        request: &SpeechRequest,
    ) -> impl Future<Output = Result<SpeechResponse, GenerationError>>;
}

/// Result of a generation that reached the provider and came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Audio decoded and ready to play or export.
    Ready,
    /// The provider answered without an audio payload.
    Empty,
}

/// Cancels whatever generation is in flight when `cancel` is called.
#[derive(Debug, Clone)]
pub struct GenerationCanceller {
    tx: Arc<watch::Sender<u64>>,
}

impl GenerationCanceller {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_modify(|epoch| *epoch += 1);
    }

    /// Receiver that only sees cancellations issued after this call.
    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

/// Resolve `work`, or fail with `Cancelled` if `cancelled` fires first.
pub(crate) async fn cancellable<T>(
    work: impl Future<Output = Result<T, GenerationError>>,
    mut cancelled: watch::Receiver<u64>,
) -> Result<T, GenerationError> {
    tokio::select! {
        result = work => result,
        _ = cancelled.changed() => Err(GenerationError::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wins_over_slow_work() {
        let canceller = GenerationCanceller::new();
        let rx = canceller.subscribe();

        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        };
        let trigger = canceller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        assert!(matches!(cancellable(slow, rx).await, Err(GenerationError::Cancelled)));
    }

    #[tokio::test]
    async fn test_earlier_cancel_not_seen() {
        let canceller = GenerationCanceller::new();
        canceller.cancel();
        let rx = canceller.subscribe();

        let result = cancellable(async { Ok(7) }, rx).await;
        assert_eq!(result.unwrap(), 7);
    }
}
