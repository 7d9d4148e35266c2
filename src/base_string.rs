//! Signature base string construction (RFC 5849 section 3.4.1).

use http::Method;
use url::Url;

use crate::encode::{normalize_parameters, percent_encode};
use crate::{SignError, SignResult, OAUTH_SIGNATURE_KEY, REALM_KEY};

/// Everything that goes into one signature, frozen at construction.
///
/// The request URL's own query pairs are folded into `parameters` here, so
/// callers pass only the protocol and form-body parameters.
#[derive(Debug, Clone)]
pub struct SignatureBaseString {
    method: String,
    base_uri: String,
    parameters: Vec<(String, String)>,
}

impl SignatureBaseString {
    pub fn new<I, K, V>(method: &Method, url: &Url, parameters: I) -> SignResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let base_uri = base_string_uri(url)?;
        let parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .chain(url.query_pairs().into_owned())
            .filter(|(k, _)| k != OAUTH_SIGNATURE_KEY && k != REALM_KEY)
            .collect();

        Ok(SignatureBaseString {
            method: method.as_str().to_ascii_uppercase(),
            base_uri,
            parameters,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The normalized parameter string, before the outer encoding.
    pub fn normalized_parameters(&self) -> String {
        normalize_parameters(self.parameters.iter().map(|(k, v)| (k, v)))
    }

    /// `METHOD&enc(base uri)&enc(normalized parameters)`
    pub fn build(&self) -> String {
        format!(
            "{}&{}&{}",
            self.method,
            percent_encode(&self.base_uri),
            percent_encode(&self.normalized_parameters())
        )
    }
}

/// Base string URI: lowercased scheme and host, default port dropped, no
/// query, no fragment.
pub fn base_string_uri(url: &Url) -> SignResult<String> {
    let scheme = url.scheme().to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(SignError::UnsupportedScheme(scheme));
    }
    let host = url
        .host_str()
        .ok_or_else(|| SignError::MissingHost(url.to_string()))?
        .to_ascii_lowercase();

    let mut uri = format!("{}://{}", scheme, host);
    match (scheme.as_str(), url.port()) {
        (_, None) | ("http", Some(80)) | ("https", Some(443)) => {}
        (_, Some(port)) => uri.push_str(&format!(":{}", port)),
    }
    let path = url.path();
    uri.push_str(if path.is_empty() { "/" } else { path });
    Ok(uri)
}
