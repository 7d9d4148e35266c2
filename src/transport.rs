//! The seam to the HTTP layer that actually moves bytes.

use std::borrow::Cow;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::{TransportError, OAUTH_KEY_PREFIX};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An outgoing request, before or after signing.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        HttpRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        HttpRequest::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        HttpRequest::new(Method::POST, url)
    }

    /// Add a `Header` to this Request.
    pub fn header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Modify the query string of the URL.
    ///
    /// This method appends and does not overwrite: calling
    /// `.query(&[("foo", "a"), ("foo", "b")])` gives `"foo=a&foo=b"`.
    pub fn query<T: Serialize + ?Sized>(
        mut self,
        query: &T,
    ) -> Result<Self, serde_urlencoded::ser::Error> {
        {
            let mut pairs = self.url.query_pairs_mut();
            let serializer = serde_urlencoded::Serializer::new(&mut pairs);
            query.serialize(serializer)?;
        }
        if let Some("") = self.url.query() {
            self.url.set_query(None);
        }
        Ok(self)
    }

    /// Send a form body. Its pairs take part in the signature.
    pub fn form<T: Serialize + ?Sized>(
        mut self,
        form: &T,
    ) -> Result<Self, serde_urlencoded::ser::Error> {
        self.body = serde_urlencoded::to_string(form)?.into_bytes();
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
        Ok(self)
    }

    /// Set a raw request body. It is not signed.
    pub fn body<T: Into<Vec<u8>>>(mut self, body: T) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_form(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_start().to_ascii_lowercase().starts_with(FORM_URLENCODED))
            .unwrap_or(false)
    }

    /// Decoded pairs of a form-encoded body, empty for any other body.
    pub fn form_parameters(&self) -> Vec<(String, String)> {
        if !self.is_form() {
            return Vec::new();
        }
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }

    /// Drop `oauth_*` pairs left over from an earlier signature, from both
    /// the query and a form body. Other pairs keep their order.
    pub(crate) fn strip_protocol_parameters(&mut self) {
        if self.url.query_pairs().any(|(k, _)| is_protocol_key(&k)) {
            let kept: Vec<(String, String)> = self
                .url
                .query_pairs()
                .into_owned()
                .filter(|(k, _)| !is_protocol_key(k))
                .collect();
            if kept.is_empty() {
                self.url.set_query(None);
            } else {
                self.url.query_pairs_mut().clear().extend_pairs(kept);
            }
        }

        let form = self.form_parameters();
        if form.iter().any(|(k, _)| is_protocol_key(k)) {
            self.body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form.iter().filter(|(k, _)| !is_protocol_key(k)))
                .finish()
                .into_bytes();
        }
    }

    /// Merge `params` into the form body, or into the query when there is none.
    pub(crate) fn append_parameters(&mut self, params: Vec<(&str, &str)>) {
        if self.is_form() {
            let mut body = String::from_utf8_lossy(&self.body).into_owned();
            {
                let mut serializer = url::form_urlencoded::Serializer::for_suffix(&mut body, 0);
                serializer.extend_pairs(params);
                serializer.finish();
            }
            self.body = body.into_bytes();
        } else {
            self.url.query_pairs_mut().extend_pairs(params);
        }
    }
}

fn is_protocol_key(key: &str) -> bool {
    key.starts_with(OAUTH_KEY_PREFIX)
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new<T: Into<Vec<u8>>>(status: StatusCode, body: T) -> Self {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Issues a request and hands back whatever the server answered.
///
/// Non-2xx statuses are a successful `issue`; only failures to get any
/// answer at all are errors. Retries and timeouts belong to implementors.
pub trait Transport {
    fn issue(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn issue(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).issue(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn issue(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).issue(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn issue(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).issue(request)
    }
}
