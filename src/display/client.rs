//! HTTP client for the display page.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::page::{BuildView, DisplayPage, FetchState, HealthInfo};
use crate::error::ClientError;

const HEALTH_PATH: &str = "/api/health";
const BUILD_PATH: &str = "/api/builds/permafrost-marshal";

/// Fetches the two display views from a running data server.
#[derive(Debug, Clone)]
pub struct DisplayClient {
    http: reqwest::Client,
    base: Url,
}

impl DisplayClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: Url::parse(base_url)?,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Issue both fetches concurrently, each exactly once.
    pub async fn load(&self) -> DisplayPage {
        let mut page = DisplayPage::default();
        let (health, build) = tokio::join!(self.health(), self.build());
        page.health.settle(health);
        page.build.settle(build);
        page
    }

    /// Fetch service health.
    pub async fn health(&self) -> FetchState<HealthInfo> {
        self.fetch(HEALTH_PATH, "Health").await
    }

    /// Fetch the Permafrost Marshal build.
    pub async fn build(&self) -> FetchState<BuildView> {
        self.fetch(BUILD_PATH, "Build").await
    }

    #[instrument(skip(self))]
    async fn fetch<T: DeserializeOwned>(&self, path: &str, label: &str) -> FetchState<T> {
        let url = match self.base.join(path) {
            Ok(url) => url,
            Err(e) => return FetchState::Failed(ClientError::from(e).to_string()),
        };

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return FetchState::Failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success status");
            return FetchState::Failed(format!("{label} request failed with {}", status.as_u16()));
        }

        match response.json::<T>().await {
            Ok(data) => {
                debug!("Fetched");
                FetchState::Loaded(data)
            }
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(DisplayClient::new("not a url"), Err(ClientError::Url(_))));
    }

    #[test]
    fn resolves_api_paths_against_base() {
        let client = DisplayClient::new("http://localhost:3001").unwrap();
        assert_eq!(
            client.base().join(BUILD_PATH).unwrap().as_str(),
            "http://localhost:3001/api/builds/permafrost-marshal"
        );
    }

    #[tokio::test]
    async fn unreachable_server_fails_both_views() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = DisplayClient::new(&format!("http://{addr}")).unwrap();
        let page = client.load().await;

        assert!(matches!(page.health, FetchState::Failed(_)));
        assert!(matches!(page.build, FetchState::Failed(_)));
    }
}
