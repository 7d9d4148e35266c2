//! The three-legged handshake that turns consumer credentials into an
//! [`AccessToken`].
//!
//! Each step consumes the previous one, so a temporary token can't be
//! exchanged twice and a verifier can't be applied to the wrong token.
//!
//! ```text
//! Handshake --request_temporary_token--> PendingAuthorization
//!           --authorize(verifier)-------> AuthorizedRequest
//!             or authorize_callback(url)
//!           --exchange------------------> AccessToken
//! ```

use http::header::{HeaderValue, CONTENT_TYPE};
use http::Method;
use tracing::{debug, warn};
use url::Url;

use crate::config::Endpoints;
use crate::signer::{OAuthParameters, Signer, Transmission};
use crate::token_reader::{read_oauth_token, received_keys, TokenResponse};
use crate::transport::{HttpRequest, Transport};
use crate::{
    AccessToken, Credentials, Error, HandshakeError, HandshakeResult, Phase, Result,
    TemporaryToken, Verifier, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
};

const OUT_OF_BAND: &str = "oob";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    NeedTemporaryToken,
    HaveTemporaryToken,
    AuthorizedByUser,
    HaveAccessToken,
}

/// Drives the token endpoints of one authorization server.
#[derive(Debug)]
pub struct Handshake<'a, T: Transport> {
    credentials: &'a Credentials,
    endpoints: &'a Endpoints,
    transport: T,
    method: Method,
    transmission: Transmission,
    callback: Option<String>,
}

impl<'a, T: Transport> Handshake<'a, T> {
    pub fn new(credentials: &'a Credentials, endpoints: &'a Endpoints, transport: T) -> Self {
        Handshake {
            credentials,
            endpoints,
            transport,
            method: Method::POST,
            transmission: Transmission::default(),
            callback: None,
        }
    }

    /// Callback URL sent with the temporary token request; `oob` when unset.
    pub fn callback<C: Into<String>>(self, callback: C) -> Self {
        Handshake {
            callback: Some(callback.into()),
            ..self
        }
    }

    pub fn transmission(self, transmission: Transmission) -> Self {
        Handshake {
            transmission,
            ..self
        }
    }

    /// HTTP method for both token requests, POST by default.
    pub fn method(self, method: Method) -> Self {
        Handshake { method, ..self }
    }

    pub fn state(&self) -> HandshakeState {
        HandshakeState::NeedTemporaryToken
    }

    /// Obtain temporary credentials and the URL the user must visit.
    pub fn request_temporary_token(&self) -> Result<PendingAuthorization> {
        let callback = self.callback.as_deref().unwrap_or(OUT_OF_BAND);
        debug!(
            endpoint = self.endpoints.temporary_token().as_str(),
            callback,
            "requesting temporary token"
        );
        let parameters = OAuthParameters::new()
            .callback(callback)
            .transmission(self.transmission);
        let signer = Signer::new(self.credentials, parameters);

        let response = self.execute(
            Phase::TemporaryToken,
            self.endpoints.temporary_token(),
            &signer,
        )?;
        let temporary_token = response.into_temporary_token();
        if temporary_token.callback_confirmed != Some(true) {
            warn!(
                callback_confirmed = ?temporary_token.callback_confirmed,
                "server did not confirm oauth_callback"
            );
        }

        let authorization_url = self.endpoints.authorization_url(&temporary_token);
        Ok(PendingAuthorization {
            temporary_token,
            authorization_url,
        })
    }

    /// Trade an authorized temporary token for token credentials.
    pub fn exchange(&self, authorized: AuthorizedRequest) -> Result<AccessToken> {
        debug!(
            endpoint = self.endpoints.access_token().as_str(),
            "exchanging verifier for access token"
        );
        let parameters = OAuthParameters::new()
            .verifier(authorized.verifier.as_str())
            .transmission(self.transmission);
        let signer = Signer::new(self.credentials, parameters).token(&authorized.temporary_token);

        let response = self.execute(Phase::AccessToken, self.endpoints.access_token(), &signer)?;
        debug!("access token acquired");
        Ok(response.into_access_token())
    }

    fn execute(&self, phase: Phase, endpoint: &Url, signer: &Signer<'_>) -> Result<TokenResponse> {
        let mut request = HttpRequest::new(self.method.clone(), endpoint.clone());
        if self.method == Method::POST {
            request = request.header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        signer.sign_request(&mut request)?;

        let response = self
            .transport
            .issue(request)
            .map_err(|source| Error::Transport { phase, source })?;
        let body = response.text();
        if !response.status.is_success() {
            return Err(HandshakeError::Rejected {
                phase,
                status: response.status,
                body: body.into_owned(),
            }
            .into());
        }
        Ok(read_oauth_token(&body)?)
    }
}

/// Temporary credentials waiting for the user's approval.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub temporary_token: TemporaryToken,
    pub authorization_url: Url,
}

impl PendingAuthorization {
    pub fn state(&self) -> HandshakeState {
        HandshakeState::HaveTemporaryToken
    }

    /// Attach the verifier the user brought back.
    pub fn authorize<V: Into<Verifier>>(self, verifier: V) -> AuthorizedRequest {
        AuthorizedRequest {
            temporary_token: self.temporary_token,
            verifier: verifier.into(),
        }
    }

    /// Take the verifier from the URL the server redirected the user to.
    ///
    /// The callback's `oauth_token` must name this temporary token; a
    /// callback without one is accepted.
    pub fn authorize_callback(self, callback: &Url) -> HandshakeResult<AuthorizedRequest> {
        let mut token = None;
        let mut verifier = None;
        for (key, value) in callback.query_pairs() {
            match &*key {
                OAUTH_TOKEN_KEY => token = Some(value.into_owned()),
                OAUTH_VERIFIER_KEY => verifier = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(token) = token {
            if token != self.temporary_token.token {
                return Err(HandshakeError::TokenMismatch(token));
            }
        }
        let verifier = verifier.ok_or_else(|| {
            HandshakeError::TokenKeyNotFound(
                OAUTH_VERIFIER_KEY,
                received_keys(callback.query().unwrap_or_default()),
            )
        })?;
        Ok(self.authorize(verifier))
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizedRequest {
    temporary_token: TemporaryToken,
    verifier: Verifier,
}

impl AuthorizedRequest {
    pub fn state(&self) -> HandshakeState {
        HandshakeState::AuthorizedByUser
    }

    pub fn temporary_token(&self) -> &TemporaryToken {
        &self.temporary_token
    }
}

impl AccessToken {
    pub fn state(&self) -> HandshakeState {
        HandshakeState::HaveAccessToken
    }
}

#[cfg(test)]
mod tests {
    use http::header::AUTHORIZATION;
    use http::StatusCode;

    use super::*;
    use crate::transport::tests::ScriptedTransport;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://api.example.com/oauth/request_token",
            "https://api.example.com/oauth/authorize",
            "https://api.example.com/oauth/access_token",
        )
        .unwrap()
    }

    fn authorization_header(request: &HttpRequest) -> String {
        request
            .headers
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn full_handshake() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default()
            .respond(
                StatusCode::OK,
                "oauth_token=tt&oauth_token_secret=tts&oauth_callback_confirmed=true",
            )
            .respond(
                StatusCode::OK,
                "oauth_token=at&oauth_token_secret=ats&user_id=42",
            );
        let handshake = Handshake::new(&credentials, &endpoints, &transport);
        assert_eq!(handshake.state(), HandshakeState::NeedTemporaryToken);

        let pending = handshake.request_temporary_token().unwrap();
        assert_eq!(pending.state(), HandshakeState::HaveTemporaryToken);
        assert_eq!(pending.temporary_token.token, "tt");
        assert_eq!(pending.temporary_token.token_secret.expose(), "tts");
        assert_eq!(
            pending.authorization_url.as_str(),
            "https://api.example.com/oauth/authorize?oauth_token=tt"
        );

        let authorized = pending.authorize("v123");
        assert_eq!(authorized.state(), HandshakeState::AuthorizedByUser);

        let access = handshake.exchange(authorized).unwrap();
        assert_eq!(access.state(), HandshakeState::HaveAccessToken);
        assert_eq!(access.token, "at");
        assert_eq!(access.token_secret.expose(), "ats");
        assert_eq!(access.extra.get("user_id").map(String::as_str), Some("42"));

        let first = transport.request(0);
        assert_eq!(first.method, Method::POST);
        assert_eq!(first.url.path(), "/oauth/request_token");
        let header = authorization_header(&first);
        assert!(header.contains("oauth_callback=\"oob\""));
        assert!(!header.contains("oauth_token="));

        let second = transport.request(1);
        assert_eq!(second.url.path(), "/oauth/access_token");
        let header = authorization_header(&second);
        assert!(header.contains("oauth_token=\"tt\""));
        assert!(header.contains("oauth_verifier=\"v123\""));
        assert!(!header.contains("oauth_callback="));
    }

    #[test]
    fn configured_callback_is_sent() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default().respond(
            StatusCode::OK,
            "oauth_token=tt&oauth_token_secret=tts&oauth_callback_confirmed=true",
        );
        Handshake::new(&credentials, &endpoints, &transport)
            .callback("https://app.example.com/cb")
            .request_temporary_token()
            .unwrap();

        let header = authorization_header(&transport.request(0));
        assert!(header.contains("oauth_callback=\"https%3A%2F%2Fapp.example.com%2Fcb\""));
    }

    #[test]
    fn unconfirmed_callback_still_proceeds() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default()
            .respond(StatusCode::OK, "oauth_token=tt&oauth_token_secret=tts");
        let pending = Handshake::new(&credentials, &endpoints, &transport)
            .request_temporary_token()
            .unwrap();
        assert_eq!(pending.temporary_token.callback_confirmed, None);
    }

    #[test]
    fn token_requests_can_carry_parameters_in_the_body() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default()
            .respond(StatusCode::OK, "oauth_token=tt&oauth_token_secret=tts");
        Handshake::new(&credentials, &endpoints, &transport)
            .transmission(Transmission::RequestParameters)
            .request_temporary_token()
            .unwrap();

        let request = transport.request(0);
        assert!(request.headers.get(AUTHORIZATION).is_none());
        let body = String::from_utf8(request.body).unwrap();
        assert!(body.starts_with("oauth_consumer_key=ck&"));
        assert!(body.contains("oauth_callback=oob"));
        assert_eq!(request.url.query(), None);
    }

    fn pending(token: &str) -> PendingAuthorization {
        let temporary_token = TemporaryToken {
            token: token.to_string(),
            token_secret: "tts".into(),
            callback_confirmed: Some(true),
            extra: Default::default(),
        };
        let authorization_url = endpoints().authorization_url(&temporary_token);
        PendingAuthorization {
            temporary_token,
            authorization_url,
        }
    }

    #[test]
    fn callback_verifier_for_the_pending_token() {
        let callback =
            Url::parse("https://app.example.com/cb?oauth_token=tt&oauth_verifier=v123").unwrap();
        let authorized = pending("tt").authorize_callback(&callback).unwrap();
        assert_eq!(authorized.state(), HandshakeState::AuthorizedByUser);
        assert_eq!(authorized.verifier.as_str(), "v123");
        assert_eq!(authorized.temporary_token().token, "tt");

        let verifier_only = Url::parse("https://app.example.com/cb?oauth_verifier=v9").unwrap();
        let authorized = pending("tt").authorize_callback(&verifier_only).unwrap();
        assert_eq!(authorized.verifier.as_str(), "v9");
    }

    #[test]
    fn callback_for_another_token() {
        let callback =
            Url::parse("https://app.example.com/cb?oauth_token=other&oauth_verifier=v123").unwrap();
        match pending("tt").authorize_callback(&callback) {
            Err(HandshakeError::TokenMismatch(token)) => assert_eq!(token, "other"),
            other => panic!("expected a token mismatch, got {:?}", other),
        }
    }

    #[test]
    fn callback_without_verifier() {
        let callback = Url::parse("https://app.example.com/cb?oauth_token=tt&denied=tt").unwrap();
        match pending("tt").authorize_callback(&callback) {
            Err(HandshakeError::TokenKeyNotFound(key, seen)) => {
                assert_eq!(key, OAUTH_VERIFIER_KEY);
                assert_eq!(seen, "[oauth_token, denied]");
            }
            other => panic!("expected a missing verifier, got {:?}", other),
        }
    }

    #[test]
    fn rejected_verifier() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default()
            .respond(StatusCode::OK, "oauth_token=tt&oauth_token_secret=tts")
            .respond(StatusCode::UNAUTHORIZED, "oauth_problem=verifier_invalid");
        let handshake = Handshake::new(&credentials, &endpoints, &transport);

        let authorized = handshake
            .request_temporary_token()
            .unwrap()
            .authorize("wrong");
        match handshake.exchange(authorized) {
            Err(Error::Handshake(HandshakeError::Rejected {
                phase,
                status,
                body,
            })) => {
                assert_eq!(phase, Phase::AccessToken);
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "oauth_problem=verifier_invalid");
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn missing_token_secret() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default().respond(StatusCode::OK, "oauth_token=tt");
        let err = Handshake::new(&credentials, &endpoints, &transport)
            .request_temporary_token()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Handshake(HandshakeError::TokenKeyNotFound("oauth_token_secret", _))
        ));
    }

    #[test]
    fn transport_failure_names_the_phase() {
        let credentials = Credentials::new("ck", "cs").unwrap();
        let endpoints = endpoints();
        let transport = ScriptedTransport::default().fail("connection reset");
        let err = Handshake::new(&credentials, &endpoints, &transport)
            .request_temporary_token()
            .unwrap_err();
        match err {
            Error::Transport { phase, ref source } => {
                assert_eq!(phase, Phase::TemporaryToken);
                assert_eq!(source.to_string(), "connection reset");
            }
            ref other => panic!("expected a transport error, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "transport failed during temporary token request : connection reset"
        );
    }
}
