use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use http::header::{HeaderValue, AUTHORIZATION};
use http::Method;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::base_string::SignatureBaseString;
use crate::encode::percent_encode;
use crate::sensitive::Sensitive;
use crate::transport::HttpRequest;
use crate::{
    Credentials, SignError, SignResult, SignatureMethod, TokenCredentials, OAUTH_CALLBACK_KEY,
    OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY, OAUTH_VERSION, OAUTH_VERSION_KEY,
    REALM_KEY,
};

/// Where the signed protocol parameters end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    /// `Authorization: OAuth ...`, leaves the payload untouched.
    AuthorizationHeader,
    /// Appended to the form body if the request has one, else to the query.
    RequestParameters,
}

impl Default for Transmission {
    fn default() -> Self {
        Transmission::AuthorizationHeader
    }
}

/// Per-request protocol options.
///
/// Nonce and timestamp are generated fresh for every signature unless pinned
/// here, which only makes sense for reproducing known signatures.
#[derive(Debug, Clone)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
    transmission: Transmission,
}

impl Default for OAuthParameters<'_> {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            timestamp: None,
            verifier: None,
            version: true,
            transmission: Transmission::default(),
        }
    }
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value, `oob` for out-of-band
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value, sent in the header only and never signed
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// Include `oauth_version="1.0"` (the default) or leave it out.
    ///
    /// In oauth1, oauth_version value must be "1.0" or not specified.
    pub fn version(self, version: bool) -> Self {
        OAuthParameters { version, ..self }
    }

    pub fn transmission(self, transmission: Transmission) -> Self {
        OAuthParameters {
            transmission,
            ..self
        }
    }
}

/// Assembles and signs the protocol parameters of one request.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    token: Option<(&'a str, Sensitive<&'a str>)>,
    parameters: OAuthParameters<'a>,
}

impl<'a> Signer<'a> {
    pub fn new(credentials: &'a Credentials, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            credentials,
            token: None,
            parameters,
        }
    }

    /// Sign with `token`; its secret joins the signing key.
    pub fn token<T: TokenCredentials>(self, token: &'a T) -> Self {
        let (token, secret) = token.token_pair();
        Signer {
            token: Some((token, Sensitive::new(secret))),
            ..self
        }
    }

    /// Compute the signed protocol parameters for `method` and `url`.
    ///
    /// `form` holds the decoded pairs of a form-encoded body, if any; the
    /// query of `url` is picked up on its own.
    pub fn generate_signature(
        &self,
        method: &Method,
        url: &Url,
        form: &[(String, String)],
    ) -> SignResult<Authorization> {
        let signature_method = self.credentials.signature_method();
        if signature_method == SignatureMethod::Plaintext && url.scheme() != "https" {
            return Err(SignError::InsecurePlaintext(url.scheme().to_string()));
        }

        let protocol = self.protocol_parameters()?;
        let base = SignatureBaseString::new(
            method,
            url,
            protocol
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .chain(form.iter().cloned()),
        )?;
        debug!(
            method = base.method(),
            url = base.base_uri(),
            signature_method = signature_method.as_str(),
            has_token = self.token.is_some(),
            "signing request"
        );
        let base_string = base.build();
        trace!(base_string = %base_string, "signature base string");

        let token_secret = self.token.as_ref().map(|(_, secret)| *secret.expose());
        let signature = signature_method
            .sign(&base_string, &self.credentials.key_material(token_secret))?;

        Ok(Authorization {
            protocol,
            signature,
            realm: self.parameters.realm.as_ref().map(|r| r.to_string()),
        })
    }

    /// Sign `request` and write the result into it according to the
    /// configured [`Transmission`].
    ///
    /// `oauth_*` pairs from an earlier signature are removed first, so a
    /// request can be signed again before a retry.
    pub fn sign_request(&self, request: &mut HttpRequest) -> SignResult<()> {
        request.strip_protocol_parameters();
        let form = request.form_parameters();
        let authorization = self.generate_signature(&request.method, &request.url, &form)?;

        match self.parameters.transmission {
            Transmission::AuthorizationHeader => {
                let mut value = HeaderValue::from_str(&authorization.to_header_value())
                    .map_err(|e| SignError::UnwritableParameters(e.to_string()))?;
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Transmission::RequestParameters => {
                // a PLAINTEXT signature is the shared secret itself
                if self.credentials.signature_method() == SignatureMethod::Plaintext
                    && !request.is_form()
                {
                    return Err(SignError::UnwritableParameters(
                        "PLAINTEXT signatures are never put into the query string".to_string(),
                    ));
                }
                request.append_parameters(authorization.parameters());
            }
        }
        Ok(())
    }

    fn protocol_parameters(&self) -> SignResult<Vec<(&'static str, String)>> {
        let mut params = Vec::with_capacity(8);
        params.push((OAUTH_CONSUMER_KEY, self.credentials.consumer_key().to_string()));
        if let Some((token, _)) = &self.token {
            params.push((OAUTH_TOKEN_KEY, token.to_string()));
        }
        params.push((
            OAUTH_SIGNATURE_METHOD_KEY,
            self.credentials.signature_method().as_str().to_string(),
        ));
        let timestamp = match self.parameters.timestamp {
            Some(timestamp) => timestamp,
            None => timestamp_at(SystemTime::now())?,
        };
        params.push((OAUTH_TIMESTAMP_KEY, timestamp.to_string()));
        params.push((
            OAUTH_NONCE_KEY,
            match self.parameters.nonce {
                Some(ref nonce) => nonce.to_string(),
                None => generate_nonce(),
            },
        ));
        if self.parameters.version {
            params.push((OAUTH_VERSION_KEY, OAUTH_VERSION.to_string()));
        }
        if let Some(ref callback) = self.parameters.callback {
            params.push((OAUTH_CALLBACK_KEY, callback.to_string()));
        }
        if let Some(ref verifier) = self.parameters.verifier {
            params.push((OAUTH_VERIFIER_KEY, verifier.to_string()));
        }
        Ok(params)
    }
}

/// Signed protocol parameters of one request.
#[derive(Debug, Clone)]
pub struct Authorization {
    protocol: Vec<(&'static str, String)>,
    signature: String,
    realm: Option<String>,
}

impl Authorization {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if key == OAUTH_SIGNATURE_KEY {
            return Some(&self.signature);
        }
        self.protocol
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All `oauth_*` pairs, signature last. The realm is not a parameter.
    pub fn parameters(&self) -> Vec<(&str, &str)> {
        self.protocol
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(std::iter::once((OAUTH_SIGNATURE_KEY, self.signature.as_str())))
            .collect()
    }

    /// `OAuth realm="...", oauth_consumer_key="...", ..., oauth_signature="..."`
    pub fn to_header_value(&self) -> String {
        let mut parts = Vec::with_capacity(self.protocol.len() + 2);
        if let Some(ref realm) = self.realm {
            parts.push(format!("{}=\"{}\"", REALM_KEY, quote_escape(realm)));
        }
        for (k, v) in self.parameters() {
            parts.push(format!("{}=\"{}\"", k, percent_encode(v)));
        }
        format!("OAuth {}", parts.join(", "))
    }
}

/// Backslash-escape `"` and `\` for an HTTP quoted-string.
fn quote_escape(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| c == '"' || c == '\\') {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// 128 random bits, hex encoded.
fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn timestamp_at(now: SystemTime) -> SignResult<u64> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SignError::ClockBeforeEpoch(e.to_string()))
}
