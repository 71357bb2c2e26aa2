use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, header::AUTHORIZATION, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};
use url::Url;

use crate::{
    domain::{
        repositories::token_store::TokenStore,
        value_objects::api::{ApiErrorBody, decode_api_payload},
    },
    infra::http::{endpoints, error::ApiError},
};

/// Media downloads stream whole files, so they get far more time than API calls.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// JSON client for the strategy backend. Every request carries the bearer
/// token from the token store when one is set. API calls share the
/// configured timeout; media downloads use [`DOWNLOAD_TIMEOUT`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token_store: Arc<dyn TokenStore + Send + Sync>,
}

impl ApiClient {
    pub fn new(
        config: &ApiClientConfig,
        token_store: Arc<dyn TokenStore + Send + Sync>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let resp = self.send(self.http.get(self.url(endpoint)), endpoint).await?;
        Self::decode(resp).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .send(self.http.post(self.url(endpoint)).json(body), endpoint)
            .await?;
        Self::decode(resp).await
    }

    /// POST without a body, decoding the response.
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let resp = self.send(self.http.post(self.url(endpoint)), endpoint).await?;
        Self::decode(resp).await
    }

    /// POST without a body where only the status matters.
    pub async fn post_command(&self, endpoint: &str) -> Result<(), ApiError> {
        self.send(self.http.post(self.url(endpoint)), endpoint)
            .await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .send(self.http.put(self.url(endpoint)).json(body), endpoint)
            .await?;
        Self::decode(resp).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(endpoint)), endpoint)
            .await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let resp = self
            .send(self.http.post(self.url(endpoint)).multipart(form), endpoint)
            .await?;
        Self::decode(resp).await
    }

    /// POST a JSON body and return the raw response bytes (audio and the like).
    pub async fn post_for_bytes<B>(&self, endpoint: &str, body: &B) -> Result<Bytes, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self
            .send(self.http.post(self.url(endpoint)).json(body), endpoint)
            .await?;
        Ok(resp.bytes().await?)
    }

    /// Fetches an absolute media URL. The bearer token is only sent to the backend's own origin.
    pub async fn download(&self, url: &str) -> Result<Bytes, ApiError> {
        let parsed =
            Url::parse(url).map_err(|err| ApiError::InvalidRequest(format!("bad url: {err}")))?;

        let same_origin = Url::parse(&self.base_url)
            .map(|base| base.origin() == parsed.origin())
            .unwrap_or(false);

        let request = self.http.get(parsed).timeout(DOWNLOAD_TIMEOUT);
        let request = if same_origin {
            self.authorized(request)
        } else {
            request
        };

        let resp = request.send().await.map_err(ApiError::from)?;
        let resp = Self::ensure_success(resp, "download").await?;
        Ok(resp.bytes().await?)
    }

    pub async fn health_check(&self) -> bool {
        match self.http.get(self.url(endpoints::HEALTH)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!(error = %ApiError::from(err), "api_client: health check failed");
                false
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token_store.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
        let resp = match self.authorized(builder).send().await {
            Ok(resp) => resp,
            Err(err) => {
                let err = ApiError::from(err);
                warn!(endpoint, error = %err, "api_client: request failed");
                return Err(err);
            }
        };

        Self::ensure_success(resp, endpoint).await
    }

    async fn ensure_success(resp: Response, endpoint: &str) -> Result<Response, ApiError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let server_message = match resp.text().await {
            Ok(body) => serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|body| body.message),
            Err(_) => None,
        };

        let err = ApiError::from_status(status, server_message);
        warn!(
            endpoint,
            status = %status,
            error = %err,
            "api_client: non-success response"
        );
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let body: Value = resp.json().await?;
        Ok(decode_api_payload(body)?)
    }
}
