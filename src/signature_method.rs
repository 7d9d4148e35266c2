use std::fmt;
use std::str::FromStr;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer as _};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::encode::percent_encode;
use crate::{ConfigError, SignError, SignResult};

/// Available `oauth_signature_method` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
    #[serde(rename = "HMAC-SHA1")]
    HmacSha1,
    #[serde(rename = "RSA-SHA1")]
    RsaSha1,
    #[serde(rename = "PLAINTEXT")]
    Plaintext,
}

impl Default for SignatureMethod {
    fn default() -> Self {
        SignatureMethod::HmacSha1
    }
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::RsaSha1 => "RSA-SHA1",
            SignatureMethod::Plaintext => "PLAINTEXT",
        }
    }

    /// Compute `oauth_signature` over `base_string`.
    ///
    /// RSA-SHA1 ignores the shared secrets; the other two ignore the RSA key.
    pub fn sign(&self, base_string: &str, keys: &KeyMaterial<'_>) -> SignResult<String> {
        match self {
            SignatureMethod::HmacSha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(keys.shared_key().as_bytes())
                    .map_err(|e| SignError::InvalidHmacKey(e.to_string()))?;
                mac.update(base_string.as_bytes());
                Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
            }
            SignatureMethod::RsaSha1 => {
                let private_key = keys.private_key.ok_or(SignError::MissingPrivateKey)?;
                let signing_key = SigningKey::<Sha1>::new(private_key.clone());
                let signature = signing_key
                    .try_sign(base_string.as_bytes())
                    .map_err(|e| SignError::Rsa(e.to_string()))?;
                Ok(BASE64_STANDARD.encode(signature.to_bytes()))
            }
            SignatureMethod::Plaintext => Ok(keys.shared_key()),
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "RSA-SHA1" => Ok(SignatureMethod::RsaSha1),
            "PLAINTEXT" => Ok(SignatureMethod::Plaintext),
            _ => Err(ConfigError::UnsupportedSignatureMethod(s.to_string())),
        }
    }
}

/// Secrets a single signature is computed with.
#[derive(Clone, Copy)]
pub struct KeyMaterial<'a> {
    pub consumer_secret: &'a str,
    pub token_secret: Option<&'a str>,
    pub private_key: Option<&'a RsaPrivateKey>,
}

impl<'a> KeyMaterial<'a> {
    /// `enc(consumer secret)&enc(token secret)`, the token part empty when absent.
    fn shared_key(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(self.consumer_secret),
            percent_encode(self.token_secret.unwrap_or_default())
        )
    }
}

impl fmt::Debug for KeyMaterial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("has_token_secret", &self.token_secret.is_some())
            .field("has_private_key", &self.private_key.is_some())
            .finish()
    }
}
