// Location provider implementations
pub mod fixed;
pub mod geoip;

pub use fixed::FixedProvider;
pub use geoip::GeoIpProvider;

use crate::models::Coordinate;

/// Collaborator contract for finding out where the owner is.
///
/// Unknown location is a normal outcome (None), never an error - lookup
/// failures and timeouts are logged by the implementor and swallowed.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current(&self) -> Option<Coordinate>;
}
