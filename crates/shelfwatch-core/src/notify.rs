// Notification delivery seam - the engine decides, the Notifier delivers
use tracing::info;

use crate::models::Tier;
use crate::Result;

/// Collaborator contract for notification delivery.
///
/// Best-effort: the scan service logs a failure and moves on. Flags record
/// "has been decided", not "was seen", so a failed delivery never rolls
/// back flag state.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn deliver(&self, tier: Tier, title: &str, body: &str) -> Result<()>;
}

/// Notifier that writes to the tracing log. The default when no richer
/// transport is wired in.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, tier: Tier, title: &str, body: &str) -> Result<()> {
        info!("[{}] {}: {}", tier, title, body);
        Ok(())
    }
}
