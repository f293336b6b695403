//! Abstraction du client HTTP
//!
//! Les clients WFS sont génériques sur [`HttpTransport`], ce qui permet de
//! substituer un transport simulé dans les tests.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};
use url::Url;

use crate::types::Credentials;
use crate::TransportError;

/// Réponse HTTP brute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Corps décodé en texte (remplacement des séquences UTF-8 invalides)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Opérations HTTP nécessaires aux clients WFS
pub trait HttpTransport: Send + Sync {
    /// GET avec délai d'attente borné
    fn get(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// POST d'un document XML avec authentification Basic et délai borné
    fn post_xml(
        &self,
        url: &Url,
        body: String,
        credentials: &Credentials,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Transport réel basé sur reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Réutilise un client reqwest existant (pool de connexions partagé)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

async fn read_response(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    trace!(status, bytes = body.len(), "HTTP response received");
    Ok(HttpResponse { status, body })
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse, TransportError> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "GET");
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_response(response).await
    }

    async fn post_xml(
        &self,
        url: &Url,
        body: String,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        debug!(
            url = %url,
            bytes = body.len(),
            user = %credentials.username,
            timeout_ms = timeout.as_millis() as u64,
            "POST"
        );
        let response = self
            .client
            .post(url.clone())
            .timeout(timeout)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .header(reqwest::header::ACCEPT, "application/xml")
            .basic_auth(&credentials.username, credentials.password.as_ref())
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_response(response).await
    }
}
