use http::header::{HeaderName, HeaderValue};
use serde::Serialize;

use crate::authorizer::Authorize;
use crate::client::Client;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::Result;

/// A request being put together for a [`Client`].
///
/// Encoding failures are held until [`RequestBuilder::send`].
pub struct RequestBuilder<'a, T, A> {
    client: &'a Client<T, A>,
    request: Result<HttpRequest>,
}

impl<'a, T: Transport, A: Authorize> RequestBuilder<'a, T, A> {
    pub(crate) fn new(client: &'a Client<T, A>, request: HttpRequest) -> Self {
        RequestBuilder {
            client,
            request: Ok(request),
        }
    }

    /// Add a `Header` to this Request.
    pub fn header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        if let Ok(ref mut req) = self.request {
            req.headers.insert(key, value);
        }
        self
    }

    /// Modify the query string of the URL.
    ///
    /// Appends to whatever the URL already has. Query pairs are signed.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.request = self
            .request
            .and_then(|req| req.query(query).map_err(Into::into));
        self
    }

    /// Send a form body. Its pairs are signed.
    pub fn form<F: Serialize + ?Sized>(mut self, form: &F) -> Self {
        self.request = self
            .request
            .and_then(|req| req.form(form).map_err(Into::into));
        self
    }

    /// Set a raw body, which is not signed.
    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.request = self.request.map(|req| req.body(body));
        self
    }

    /// Build the request without signing or sending it.
    pub fn build(self) -> Result<HttpRequest> {
        self.request
    }

    /// Sign the request and hand it to the transport.
    pub fn send(self) -> Result<HttpResponse> {
        let request = self.request?;
        self.client.send(request)
    }
}
