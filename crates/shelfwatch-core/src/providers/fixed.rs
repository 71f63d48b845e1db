use super::LocationProvider;
use crate::models::Coordinate;

/// Always reports the configured coordinate. Used when the owner has set a
/// home location in the config, and in tests.
pub struct FixedProvider {
    coordinate: Option<Coordinate>,
}

impl FixedProvider {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
        }
    }

    /// A provider that never knows where it is
    pub fn unknown() -> Self {
        Self { coordinate: None }
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedProvider {
    async fn current(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_provider() {
        let home = Coordinate {
            lat: 28.61,
            lon: 77.20,
        };
        assert_eq!(FixedProvider::new(home).current().await, Some(home));
        assert_eq!(FixedProvider::unknown().current().await, None);
    }
}
