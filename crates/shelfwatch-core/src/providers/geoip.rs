// IP-based geolocation - coarse, but works headless with no permission prompt
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::LocationProvider;
use crate::models::Coordinate;

/// The slice of an ip-api.com style response we care about
#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    status: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

/// Resolves the current coordinate from an IP geolocation endpoint
pub struct GeoIpProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl GeoIpProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    async fn lookup(&self) -> crate::Result<GeoIpResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<GeoIpResponse>().await?)
    }
}

#[async_trait::async_trait]
impl LocationProvider for GeoIpProvider {
    /// A timed-out or failed lookup resolves to unknown location, not an
    /// error - ranking falls back to its explicit unknown state.
    async fn current(&self) -> Option<Coordinate> {
        match self.lookup().await {
            Ok(geo) if geo.status == "success" => {
                debug!("geoip lookup: {:.3}, {:.3}", geo.lat, geo.lon);
                Some(Coordinate {
                    lat: geo.lat,
                    lon: geo.lon,
                })
            }
            Ok(geo) => {
                warn!("geoip endpoint rejected the lookup (status {})", geo.status);
                None
            }
            Err(e) => {
                warn!("geoip lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_resolves_to_unknown() {
        // Nothing listens on this port; must come back None, not panic or Err
        let provider = GeoIpProvider::new(
            "http://127.0.0.1:1/json".to_string(),
            Duration::from_millis(200),
        );
        assert_eq!(provider.current().await, None);
    }

    #[test]
    fn test_response_parsing() {
        let geo: GeoIpResponse =
            serde_json::from_str(r#"{"status":"success","lat":28.6448,"lon":77.2167}"#).unwrap();
        assert_eq!(geo.status, "success");
        assert!((geo.lat - 28.6448).abs() < 1e-9);

        // Failure payloads omit the coordinates
        let geo: GeoIpResponse = serde_json::from_str(r#"{"status":"fail"}"#).unwrap();
        assert_eq!(geo.status, "fail");
        assert_eq!(geo.lat, 0.0);
    }
}
