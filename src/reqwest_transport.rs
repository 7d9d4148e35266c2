use reqwest::blocking::Client as ReqwestClient;

use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::TransportError;

/// [`Transport`] backed by reqwest's blocking client.
///
/// Timeouts, proxies and TLS settings come from the wrapped client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: ReqwestClient,
}

impl ReqwestTransport {
    /// Constructs a new `ReqwestTransport`.
    ///
    /// This method calls reqwest::blocking::Client::new() internally.
    pub fn new() -> Self {
        ReqwestTransport {
            inner: ReqwestClient::new(),
        }
    }

    pub fn with_client(client: ReqwestClient) -> Self {
        ReqwestTransport { inner: client }
    }
}

impl From<ReqwestClient> for ReqwestTransport {
    fn from(client: ReqwestClient) -> Self {
        ReqwestTransport::with_client(client)
    }
}

impl Transport for ReqwestTransport {
    fn issue(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let response = self
            .inner
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .map_err(TransportError::new)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(TransportError::new)?;
        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
