use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://ip-api.com";

#[derive(Deserialize)]
struct GeoResponse {
    status: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

/// Single-shot IP-based position lookup, the closest thing a terminal
/// process has to a platform geolocation capability
#[derive(Clone)]
pub struct GeoClient {
    client: Client,
    base_url: String,
}

impl GeoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns (latitude, longitude). One request, no tracking, no retry.
    pub async fn locate(&self) -> Result<(f64, f64)> {
        let url = format!("{}/json", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Geolocation request failed with status: {}",
                response.status()
            ));
        }

        let geo: GeoResponse = response.json().await?;
        if geo.status != "success" {
            return Err(anyhow!("Geolocation lookup failed"));
        }

        Ok((geo.lat, geo.lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locate_parses_coordinates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "success", "lat": 35.6812, "lon": 139.7671}"#)
            .create_async()
            .await;

        let client = GeoClient::with_base_url(&server.url());
        let (lat, lon) = client.locate().await.unwrap();
        assert!((lat - 35.6812).abs() < 1e-9);
        assert!((lon - 139.7671).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_locate_rejects_failed_lookup() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "fail"}"#)
            .create_async()
            .await;

        let client = GeoClient::with_base_url(&server.url());
        assert!(client.locate().await.is_err());
    }

    #[tokio::test]
    async fn test_locate_rejects_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/json").with_status(503).create_async().await;

        let client = GeoClient::with_base_url(&server.url());
        assert!(client.locate().await.is_err());
    }
}
