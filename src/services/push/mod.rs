pub mod expo;

use async_trait::async_trait;

/// Notification Dispatcher seam. Delivery failures are the caller's to log;
/// they must never fail the booking operation that triggered them.
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()>;
}
