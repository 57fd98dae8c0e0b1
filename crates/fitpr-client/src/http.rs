//! HTTP client for the fitpr service

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use fitpr_api::{
    requests::VerifyPinRequest,
    responses::{HealthResponse, ServiceInfo, VerifyPinResponse},
};

use crate::error::{ClientError, Result};

/// HTTP client for communicating with the fitpr service
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use fitpr_client::HttpClient;
    ///
    /// let client = HttpClient::new("http://localhost:8000")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Relative joins keep a path prefix only under a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from a path relative to the base URL
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Perform a POST request with JSON body
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl serde::Serialize,
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.client.post(url).json(&body).send().await?;
        Self::decode(response).await
    }

    /// Deserialize a success body, or the service's error body
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request failed");
        Err(ClientError::from_body(status.as_u16(), body))
    }

    /// Get service information
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    pub async fn root(&self) -> Result<ServiceInfo> {
        self.get("").await
    }

    /// Get service health status
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    ///
    /// # Example
    /// ```no_run
    /// # use fitpr_client::HttpClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("http://localhost:8000")?;
    /// let health = client.health().await?;
    /// println!("Status: {}", health.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("health").await
    }

    /// Verify a client's PIN
    ///
    /// # Errors
    /// Returns `ClientError::Api` when the service rejects the PIN, with the
    /// error code telling malformed input, unknown clients, disabled access
    /// and wrong PINs apart.
    pub async fn verify_pin(
        &self,
        client_id: impl Into<String>,
        pin: impl Into<String>,
    ) -> Result<VerifyPinResponse> {
        let request = VerifyPinRequest {
            client_id: client_id.into(),
            pin: pin.into(),
        };
        self.post("api/v1/auth/pin", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:8000");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new("not a url");
        assert!(matches!(client, Err(ClientError::Url(_))));
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
        let url = client.url("api/v1/auth/pin").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/auth/pin");
    }

    #[test]
    fn test_url_building_keeps_path_prefix() {
        for base in ["https://api.example.com/api", "https://api.example.com/api/"] {
            let client = HttpClient::new(base).unwrap();
            assert_eq!(client.url("health").unwrap().as_str(), "https://api.example.com/api/health");
            assert_eq!(client.url("").unwrap().as_str(), "https://api.example.com/api/");
        }
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = HttpClient::new("http://127.0.0.1:9").unwrap();
        let result = client.health().await;
        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
