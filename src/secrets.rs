use std::collections::HashMap;
use std::fmt;

use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use crate::sensitive::Sensitive;
use crate::signature_method::KeyMaterial;
use crate::{ConfigError, ConfigResult, SignatureMethod};

/// A token and its secret, always handed out as one pair so a secret is
/// never paired with another token's public value.
pub trait TokenCredentials {
    fn token_pair(&self) -> (&str, &str);
}

/// Identity of the consumer application.
///
/// Immutable once built; share it with `Arc` or by reference.
#[derive(Clone)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: Sensitive<String>,
    signature_method: SignatureMethod,
    private_key: Option<RsaPrivateKey>,
}

impl Credentials {
    pub fn builder<T: Into<String>>(consumer_key: T) -> CredentialsBuilder {
        CredentialsBuilder {
            consumer_key: consumer_key.into(),
            consumer_secret: Sensitive::default(),
            signature_method: SignatureMethod::default(),
            private_key: None,
        }
    }

    /// HMAC-SHA1 credentials, the common case.
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> ConfigResult<Self>
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credentials::builder(consumer_key)
            .consumer_secret(consumer_secret)
            .build()
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn signature_method(&self) -> SignatureMethod {
        self.signature_method
    }

    pub(crate) fn key_material<'a>(&'a self, token_secret: Option<&'a str>) -> KeyMaterial<'a> {
        KeyMaterial {
            consumer_secret: self.consumer_secret.expose(),
            token_secret,
            private_key: self.private_key.as_ref(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &self.consumer_secret)
            .field("signature_method", &self.signature_method)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub struct CredentialsBuilder {
    consumer_key: String,
    consumer_secret: Sensitive<String>,
    signature_method: SignatureMethod,
    private_key: Option<RsaPrivateKey>,
}

impl CredentialsBuilder {
    pub fn consumer_secret<T: Into<String>>(self, consumer_secret: T) -> Self {
        CredentialsBuilder {
            consumer_secret: Sensitive::new(consumer_secret.into()),
            ..self
        }
    }

    pub fn signature_method(self, signature_method: SignatureMethod) -> Self {
        CredentialsBuilder {
            signature_method,
            ..self
        }
    }

    /// Set the RSA key and switch to RSA-SHA1.
    pub fn private_key(self, private_key: RsaPrivateKey) -> Self {
        CredentialsBuilder {
            private_key: Some(private_key),
            signature_method: SignatureMethod::RsaSha1,
            ..self
        }
    }

    pub fn build(self) -> ConfigResult<Credentials> {
        if self.consumer_key.is_empty() {
            return Err(ConfigError::MissingConsumerKey);
        }
        match self.signature_method {
            SignatureMethod::RsaSha1 if self.private_key.is_none() => {
                return Err(ConfigError::MissingPrivateKey);
            }
            SignatureMethod::HmacSha1 | SignatureMethod::Plaintext
                if self.consumer_secret.is_empty() =>
            {
                return Err(ConfigError::MissingConsumerSecret(
                    self.signature_method.as_str(),
                ));
            }
            _ => {}
        }
        Ok(Credentials {
            consumer_key: self.consumer_key,
            consumer_secret: self.consumer_secret,
            signature_method: self.signature_method,
            private_key: self.private_key,
        })
    }
}

/// Temporary credentials ("request token") from the first handshake leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryToken {
    pub token: String,
    pub token_secret: Sensitive<String>,
    /// `oauth_callback_confirmed`, `None` when the server left it out.
    pub callback_confirmed: Option<bool>,
    /// Any other fields of the token response.
    pub extra: HashMap<String, String>,
}

impl TokenCredentials for TemporaryToken {
    fn token_pair(&self) -> (&str, &str) {
        (&self.token, self.token_secret.expose())
    }
}

/// `oauth_verifier` handed back once the user approved the temporary token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier(String);

impl Verifier {
    pub fn new<T: Into<String>>(verifier: T) -> Self {
        Verifier(verifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Verifier {
    fn from(verifier: &str) -> Self {
        Verifier::new(verifier)
    }
}

impl From<String> for Verifier {
    fn from(verifier: String) -> Self {
        Verifier(verifier)
    }
}

/// Long-lived token credentials. Persisting them is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub token_secret: Sensitive<String>,
    /// Any other fields of the token response, e.g. `user_id`.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl AccessToken {
    pub fn new<TKey, TSecret>(token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        AccessToken {
            token: token.into(),
            token_secret: Sensitive::new(token_secret.into()),
            extra: HashMap::new(),
        }
    }
}

impl TokenCredentials for AccessToken {
    fn token_pair(&self) -> (&str, &str) {
        (&self.token, self.token_secret.expose())
    }
}
