use crate::signer::{OAuthParameters, Signer, Transmission};
use crate::transport::HttpRequest;
use crate::{AccessToken, Credentials, Result, TokenCredentials};

/// Signs outgoing protected-resource requests.
pub trait Authorize {
    fn authorize(&self, request: &mut HttpRequest) -> Result<()>;
}

impl<A: Authorize + ?Sized> Authorize for &A {
    fn authorize(&self, request: &mut HttpRequest) -> Result<()> {
        (**self).authorize(request)
    }
}

/// Steady-state signing with a held token.
///
/// Every call draws a new nonce and timestamp, so a request that is retried
/// must be authorized again.
#[derive(Debug, Clone)]
pub struct Authorizer<'a, T: TokenCredentials = AccessToken> {
    credentials: &'a Credentials,
    token: &'a T,
    transmission: Transmission,
    realm: Option<String>,
}

impl<'a, T: TokenCredentials> Authorizer<'a, T> {
    pub fn new(credentials: &'a Credentials, token: &'a T) -> Self {
        Authorizer {
            credentials,
            token,
            transmission: Transmission::default(),
            realm: None,
        }
    }

    pub fn transmission(self, transmission: Transmission) -> Self {
        Authorizer {
            transmission,
            ..self
        }
    }

    pub fn realm<R: Into<String>>(self, realm: R) -> Self {
        Authorizer {
            realm: Some(realm.into()),
            ..self
        }
    }

    fn signer(&self) -> Signer<'_> {
        let mut parameters = OAuthParameters::new().transmission(self.transmission);
        if let Some(ref realm) = self.realm {
            parameters = parameters.realm(realm.as_str());
        }
        Signer::new(self.credentials, parameters).token(self.token)
    }
}

impl<T: TokenCredentials> Authorize for Authorizer<'_, T> {
    fn authorize(&self, request: &mut HttpRequest) -> Result<()> {
        self.signer().sign_request(request)?;
        Ok(())
    }
}
