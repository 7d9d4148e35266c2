use http::Method;
use tracing::debug;
use url::Url;

use crate::authorizer::Authorize;
use crate::request::RequestBuilder;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::{Error, Phase, Result};

/// A transport that authorizes every request before it goes out.
#[derive(Debug)]
pub struct Client<T, A> {
    inner: T,
    authorizer: A,
}

impl<T: Transport, A: Authorize> Client<T, A> {
    pub fn new(inner: T, authorizer: A) -> Self {
        Client { inner, authorizer }
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    /// Sign `request` and issue it. The response status is not inspected.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        self.authorizer.authorize(&mut request)?;
        debug!(
            method = request.method.as_str(),
            url = request.url.as_str(),
            "sending protected resource request"
        );
        self.inner
            .issue(request)
            .map_err(|source| Error::Transport {
                phase: Phase::ProtectedResource,
                source,
            })
    }

    /// Convenience method to make a `GET` request to a URL.
    pub fn get(&self, url: Url) -> RequestBuilder<'_, T, A> {
        self.request(Method::GET, url)
    }

    /// Convenience method to make a `POST` request to a URL.
    pub fn post(&self, url: Url) -> RequestBuilder<'_, T, A> {
        self.request(Method::POST, url)
    }

    /// Convenience method to make a `PUT` request to a URL.
    pub fn put(&self, url: Url) -> RequestBuilder<'_, T, A> {
        self.request(Method::PUT, url)
    }

    /// Convenience method to make a `DELETE` request to a URL.
    pub fn delete(&self, url: Url) -> RequestBuilder<'_, T, A> {
        self.request(Method::DELETE, url)
    }

    /// Start building a request with the `Method` and `Url`.
    ///
    /// Returns a `RequestBuilder`, which will allow setting headers and
    /// request body before sending.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder<'_, T, A> {
        RequestBuilder::new(self, HttpRequest::new(method, url))
    }
}
