//! Authenticated HTTP client shared by the remote adapters.

use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use trashmap_core::RemoteFetchError;

use super::SupabaseConfig;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");

/// Errors raised while building a [`SupabaseClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The API key cannot be sent as a header.
    #[error("API key is not a valid header value")]
    InvalidApiKey {
        #[source]
        source: InvalidHeaderValue,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client carrying the project credentials on every request.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is not header-safe or the HTTP
    /// client fails to build.
    pub fn new(config: SupabaseConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(auth_headers(&config.api_key)?)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|source| ClientBuildError::HttpClient { source })?;
        Ok(Self { client, config })
    }

    /// Settings the client was built with.
    pub const fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// `GET` a resource and decode its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteFetchError> {
        self.send_json(url, self.client.get(url).query(query)).await
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, RemoteFetchError> {
        self.send_json(url, self.client.post(url).json(body)).await
    }

    /// Whether the REST root answers at all within the probe timeout.
    ///
    /// Any HTTP status counts as reachable; only transport failures mean
    /// offline.
    pub(crate) async fn probe(&self) -> bool {
        let url = self.config.rest_url("");
        match self
            .client
            .head(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                debug!("connectivity probe answered {}", response.status());
                true
            }
            Err(err) => {
                debug!("connectivity probe failed: {err}");
                false
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, RemoteFetchError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        decode_body(url, &body)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RemoteFetchError {
        if error.is_timeout() {
            return RemoteFetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RemoteFetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RemoteFetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn auth_headers(api_key: &str) -> Result<HeaderMap, ClientBuildError> {
    let header = |value: &str| {
        HeaderValue::from_str(value)
            .map(|mut value| {
                value.set_sensitive(true);
                value
            })
            .map_err(|source| ClientBuildError::InvalidApiKey { source })
    };
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, header(api_key)?);
    headers.insert(AUTHORIZATION, header(&format!("Bearer {api_key}"))?);
    Ok(headers)
}

/// Decode a JSON body fetched from `url`.
pub(crate) fn decode_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RemoteFetchError> {
    serde_json::from_str(body).map_err(|err| RemoteFetchError::Decode {
        url: url.to_owned(),
        message: err.to_string(),
    })
}
