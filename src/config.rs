//! Deserializable client settings.
//!
//! The crate reads no files or environment on its own; callers load a
//! [`ClientConfig`] with whatever serde format they use and turn it into
//! [`Credentials`] and [`Endpoints`].

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::authorizer::Authorizer;
use crate::flow::Handshake;
use crate::key::{load_private_key, load_private_key_from_file};
use crate::sensitive::Sensitive;
use crate::transport::Transport;
use crate::{
    ConfigError, ConfigResult, Credentials, SignatureMethod, TemporaryToken, TokenCredentials,
    Transmission, OAUTH_TOKEN_KEY,
};

/// The three URLs of an authorization server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    temporary_token: Url,
    authorization: Url,
    access_token: Url,
}

impl Endpoints {
    pub fn new(temporary_token: &str, authorization: &str, access_token: &str) -> ConfigResult<Self> {
        Ok(Endpoints {
            temporary_token: parse_endpoint("temporary_token", temporary_token)?,
            authorization: parse_endpoint("authorization", authorization)?,
            access_token: parse_endpoint("access_token", access_token)?,
        })
    }

    pub fn temporary_token(&self) -> &Url {
        &self.temporary_token
    }

    pub fn authorization(&self) -> &Url {
        &self.authorization
    }

    pub fn access_token(&self) -> &Url {
        &self.access_token
    }

    /// Where to send the user: the authorization endpoint with
    /// `oauth_token` appended to whatever query it already has.
    pub fn authorization_url(&self, temporary_token: &TemporaryToken) -> Url {
        let mut url = self.authorization.clone();
        url.query_pairs_mut()
            .append_pair(OAUTH_TOKEN_KEY, &temporary_token.token);
        url
    }
}

fn parse_endpoint(name: &'static str, value: &str) -> ConfigResult<Url> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint(name, e))
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    pub temporary_token: String,
    pub authorization: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: Sensitive<String>,
    #[serde(default)]
    pub signature_method: SignatureMethod,
    /// PEM file holding the RSA-SHA1 key.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,
    /// Inline PEM, takes precedence over `private_key_file`.
    #[serde(default)]
    pub private_key_pem: Option<Sensitive<String>>,
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub transmission: Transmission,
    /// `oauth_callback` of the temporary token request, `oob` when unset.
    #[serde(default)]
    pub callback: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
}

impl ClientConfig {
    pub fn credentials(&self) -> ConfigResult<Credentials> {
        let mut builder = Credentials::builder(self.consumer_key.as_str())
            .consumer_secret(self.consumer_secret.expose().as_str())
            .signature_method(self.signature_method);

        if self.signature_method == SignatureMethod::RsaSha1 {
            let private_key = match (&self.private_key_pem, &self.private_key_file) {
                (Some(pem), _) => Some(load_private_key(pem.expose().as_bytes())?),
                (None, Some(path)) => Some(load_private_key_from_file(path)?),
                (None, None) => None,
            };
            if let Some(private_key) = private_key {
                builder = builder.private_key(private_key);
            }
        }
        builder.build()
    }

    pub fn endpoints(&self) -> ConfigResult<Endpoints> {
        Endpoints::new(
            &self.endpoints.temporary_token,
            &self.endpoints.authorization,
            &self.endpoints.access_token,
        )
    }

    /// Validate everything at once.
    pub fn into_parts(self) -> ConfigResult<(Credentials, Endpoints)> {
        Ok((self.credentials()?, self.endpoints()?))
    }

    /// A handshake with the configured callback and transmission.
    pub fn handshake<'a, T: Transport>(
        &self,
        credentials: &'a Credentials,
        endpoints: &'a Endpoints,
        transport: T,
    ) -> Handshake<'a, T> {
        let handshake =
            Handshake::new(credentials, endpoints, transport).transmission(self.transmission);
        match self.callback {
            Some(ref callback) => handshake.callback(callback.as_str()),
            None => handshake,
        }
    }

    /// An authorizer with the configured realm and transmission.
    pub fn authorizer<'a, T: TokenCredentials>(
        &self,
        credentials: &'a Credentials,
        token: &'a T,
    ) -> Authorizer<'a, T> {
        let authorizer = Authorizer::new(credentials, token).transmission(self.transmission);
        match self.realm {
            Some(ref realm) => authorizer.realm(realm.as_str()),
            None => authorizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::TEST_PKCS8_KEY;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://photos.example.net/initiate",
            "https://photos.example.net/authorize",
            "https://photos.example.net/token",
        )
        .unwrap()
    }

    fn temporary(token: &str) -> TemporaryToken {
        TemporaryToken {
            token: token.to_string(),
            token_secret: Sensitive::new("secret".to_string()),
            callback_confirmed: Some(true),
            extra: Default::default(),
        }
    }

    #[test]
    fn authorization_url_carries_the_token_only() {
        let url = endpoints().authorization_url(&temporary("hh5s93j4hdidpola"));
        assert_eq!(
            url.as_str(),
            "https://photos.example.net/authorize?oauth_token=hh5s93j4hdidpola"
        );
        assert!(!url.as_str().contains("secret"));
    }

    #[test]
    fn authorization_url_keeps_existing_query() {
        let endpoints = Endpoints::new(
            "https://a.example/request",
            "https://a.example/authorize?perms=write",
            "https://a.example/access",
        )
        .unwrap();
        assert_eq!(
            endpoints.authorization_url(&temporary("tt")).as_str(),
            "https://a.example/authorize?perms=write&oauth_token=tt"
        );
    }

    #[test]
    fn invalid_endpoint_is_named() {
        let err = Endpoints::new("not a url", "https://a/b", "https://a/c").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint("temporary_token", _)));
    }

    #[test]
    fn hmac_config() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "consumer_key": "ck",
            "consumer_secret": "cs",
            "endpoints": {
                "temporary_token": "https://api.example.com/oauth/request_token",
                "authorization": "https://api.example.com/oauth/authorize",
                "access_token": "https://api.example.com/oauth/access_token"
            },
            "transmission": "request_parameters",
            "callback": "https://app.example.com/callback"
        }))
        .unwrap();

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.consumer_key(), "ck");
        assert_eq!(credentials.signature_method(), SignatureMethod::HmacSha1);
        assert_eq!(config.transmission, Transmission::RequestParameters);
        assert_eq!(
            config.endpoints().unwrap().access_token().path(),
            "/oauth/access_token"
        );
        assert!(!format!("{:?}", config).contains("\"cs\""));

        let (credentials, endpoints) = config.into_parts().unwrap();
        assert_eq!(credentials.consumer_key(), "ck");
        assert_eq!(endpoints.temporary_token().path(), "/oauth/request_token");
    }

    #[test]
    fn configured_realm_and_transmission_reach_the_authorizer() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "consumer_key": "ck",
            "consumer_secret": "cs",
            "endpoints": {
                "temporary_token": "https://a.example/r",
                "authorization": "https://a.example/a",
                "access_token": "https://a.example/t"
            },
            "realm": "photos"
        }))
        .unwrap();
        let credentials = config.credentials().unwrap();
        let token = crate::AccessToken::new("at", "ats");

        let mut request =
            crate::HttpRequest::get(Url::parse("https://a.example/resource").unwrap());
        crate::Authorize::authorize(&config.authorizer(&credentials, &token), &mut request)
            .unwrap();
        let header = request.headers.get(http::header::AUTHORIZATION).unwrap();
        assert!(header.to_str().unwrap().starts_with("OAuth realm=\"photos\", "));
    }

    #[test]
    fn rsa_config_with_inline_key() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "consumer_key": "ck",
            "signature_method": "RSA-SHA1",
            "private_key_pem": TEST_PKCS8_KEY,
            "endpoints": {
                "temporary_token": "https://a.example/r",
                "authorization": "https://a.example/a",
                "access_token": "https://a.example/t"
            }
        }))
        .unwrap();
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.signature_method(), SignatureMethod::RsaSha1);
        assert_eq!(config.transmission, Transmission::AuthorizationHeader);
    }

    #[test]
    fn rsa_config_without_key_fails_fast() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "consumer_key": "ck",
            "signature_method": "RSA-SHA1",
            "endpoints": {
                "temporary_token": "https://a.example/r",
                "authorization": "https://a.example/a",
                "access_token": "https://a.example/t"
            }
        }))
        .unwrap();
        assert!(matches!(
            config.credentials().unwrap_err(),
            ConfigError::MissingPrivateKey
        ));
    }

    #[test]
    fn unknown_signature_method_is_rejected() {
        let parsed: Result<ClientConfig, _> = serde_json::from_value(serde_json::json!({
            "consumer_key": "ck",
            "consumer_secret": "cs",
            "signature_method": "HMAC-SHA256",
            "endpoints": {
                "temporary_token": "https://a.example/r",
                "authorization": "https://a.example/a",
                "access_token": "https://a.example/t"
            }
        }));
        assert!(parsed.is_err());
    }
}
