use std::fmt;

use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type HandshakeResult<T> = std::result::Result<T, HandshakeError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration : {0}")]
    Config(#[from] ConfigError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("token acquisition failed : {0}")]
    Handshake(#[from] HandshakeError),
    #[error("request parameters could not be encoded : {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("transport failed during {phase} : {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: TransportError,
    },
}

/// Raised while building a client, before any request leaves the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("consumer key must not be empty")]
    MissingConsumerKey,
    #[error("consumer secret must not be empty for {0}")]
    MissingConsumerSecret(&'static str),
    #[error("unsupported oauth_signature_method : {0}")]
    UnsupportedSignatureMethod(String),
    #[error("RSA-SHA1 requires a private key")]
    MissingPrivateKey,
    #[error("RSA private key could not be loaded : {0}")]
    PrivateKey(String),
    #[error("invalid endpoint url {0} : {1}")]
    InvalidEndpoint(&'static str, url::ParseError),
}

/// The crypto error class: a signature could not be produced.
#[derive(Error, Debug, Clone)]
pub enum SignError {
    #[error("RSA-SHA1 signing requires a private key, none was configured.")]
    MissingPrivateKey,
    #[error("invalid HMAC key : {0}")]
    InvalidHmacKey(String),
    #[error("RSA signing failed : {0}")]
    Rsa(String),
    #[error("unsupported url scheme {0}, must be http or https.")]
    UnsupportedScheme(String),
    #[error("url {0} has no host.")]
    MissingHost(String),
    #[error("PLAINTEXT signatures are only allowed over https, but got {0}.")]
    InsecurePlaintext(String),
    #[error("signed parameters could not be written into the request : {0}")]
    UnwritableParameters(String),
    #[error("system clock is before the Unix epoch : {0}")]
    ClockBeforeEpoch(String),
}

#[derive(Error, Debug, Clone)]
pub enum HandshakeError {
    #[error("{phase} was rejected with status {status} : {body}")]
    Rejected {
        phase: Phase,
        status: StatusCode,
        body: String,
    },
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
    #[error("callback carries oauth_token {0}, which is not the pending temporary token")]
    TokenMismatch(String),
}

/// Opaque failure reported by the HTTP collaborator.
#[derive(Debug)]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl TransportError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        TransportError(source.into())
    }
}

/// The protocol step that was running when a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TemporaryToken,
    AccessToken,
    ProtectedResource,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::TemporaryToken => "temporary token request",
            Phase::AccessToken => "access token request",
            Phase::ProtectedResource => "protected resource request",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_names_phase() {
        let err = Error::Transport {
            phase: Phase::AccessToken,
            source: TransportError::new("connection reset"),
        };
        assert_eq!(
            err.to_string(),
            "transport failed during access token request : connection reset"
        );
    }

    #[test]
    fn rejection_keeps_status() {
        let err = HandshakeError::Rejected {
            phase: Phase::TemporaryToken,
            status: StatusCode::UNAUTHORIZED,
            body: "oauth_problem=signature_invalid".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("signature_invalid"));
    }
}
