/*!
oauth1a-client: the client side of OAuth 1.0a (RFC 5849).

# Overview

This library signs HTTP requests with HMAC-SHA1, RSA-SHA1 or PLAINTEXT and
runs the three-legged handshake that turns consumer credentials into token
credentials. It does not open sockets itself: every request goes through a
[`Transport`], and a blocking [reqwest](https://crates.io/crates/reqwest)
implementation is available behind the default `blocking` feature.

# How to use

## Basic usecase 1 - acquiring OAuth token & secret

```rust,no_run
# fn main() -> Result<(), Box<dyn std::error::Error>> {
use std::io;
use oauth1a_client::{Credentials, Endpoints, Handshake, ReqwestTransport};

let credentials = Credentials::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
let endpoints = Endpoints::new(
    "https://api.twitter.com/oauth/request_token",
    "https://api.twitter.com/oauth/authorize",
    "https://api.twitter.com/oauth/access_token",
)?;
let handshake = Handshake::new(&credentials, &endpoints, ReqwestTransport::new());

// step 1: acquire request token & token secret
let pending = handshake.request_temporary_token()?;

// step 2: acquire user pin
println!("please access to: {}", pending.authorization_url);
println!("input pin: ");
let mut user_input = String::new();
io::stdin().read_line(&mut user_input)?;
let authorized = pending.authorize(user_input.trim());

// step 3: acquire access token
let access_token = handshake.exchange(authorized)?;
println!("your token is: {}", access_token.token);
println!("other attributes: {:#?}", access_token.extra);
# Ok(())
# }
```

## Basic usecase 2 - sending a signed request

```rust,no_run
# fn main() -> Result<(), Box<dyn std::error::Error>> {
use oauth1a_client::{AccessToken, Authorizer, Client, Credentials, ReqwestTransport};
use url::Url;

let credentials = Credentials::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
let token = AccessToken::new("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let client = Client::new(ReqwestTransport::new(), Authorizer::new(&credentials, &token));
let resp = client
    .post(Url::parse("https://api.twitter.com/1.1/statuses/update.json")?)
    .form(&[("status", "Hello, Twitter!")])
    .send()?;
println!("{}", resp.status);
# Ok(())
# }
```
*/
mod authorizer;
mod base_string;
mod client;
mod config;
mod encode;
mod error;
mod flow;
mod key;
mod request;
#[cfg(feature = "blocking")]
mod reqwest_transport;
mod secrets;
mod sensitive;
mod signature_method;
mod signer;
mod token_reader;
mod transport;

// exposed to external program
pub use authorizer::{Authorize, Authorizer};
pub use base_string::{base_string_uri, SignatureBaseString};
pub use client::Client;
pub use config::{ClientConfig, Endpoints, EndpointsConfig};
pub use encode::{normalize_parameters, percent_encode};
pub use error::{
    ConfigError, ConfigResult, Error, HandshakeError, HandshakeResult, Phase, Result, SignError,
    SignResult, TransportError,
};
pub use flow::{AuthorizedRequest, Handshake, HandshakeState, PendingAuthorization};
pub use key::{load_private_key, load_private_key_from_file};
pub use request::RequestBuilder;
#[cfg(feature = "blocking")]
pub use reqwest_transport::ReqwestTransport;
pub use secrets::{
    AccessToken, Credentials, CredentialsBuilder, TemporaryToken, TokenCredentials, Verifier,
};
pub use sensitive::Sensitive;
pub use signature_method::{KeyMaterial, SignatureMethod};
pub use signer::{Authorization, OAuthParameters, Signer, Transmission};
pub use token_reader::{read_oauth_token, TokenResponse};
pub use transport::{HttpRequest, HttpResponse, Transport};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_callback_confirmed`.
pub const OAUTH_CALLBACK_CONFIRMED_KEY: &str = "oauth_callback_confirmed";
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_token_secret`.
pub const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

/// The only `oauth_version` value defined.
pub const OAUTH_VERSION: &str = "1.0";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
