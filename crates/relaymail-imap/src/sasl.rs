//! SASL mechanisms for AUTHENTICATE.
//!
//! Implements:
//! - PLAIN (RFC 4616)
//! - OAUTHBEARER (RFC 7628)
//! - XOAUTH2 (Google/Microsoft proprietary)

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::command::Secret;

/// A SASL mechanism together with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaslMechanism {
    /// PLAIN: `authzid \0 authcid \0 password`.
    Plain {
        /// Identity to act as; empty means the authenticating user.
        authzid: Option<String>,
        /// Authentication identity.
        username: String,
        /// Password.
        password: Secret,
    },
    /// XOAUTH2: `user=<user>\x01auth=Bearer <token>\x01\x01`.
    XOAuth2 {
        /// User email address.
        user: String,
        /// `OAuth2` access token.
        token: Secret,
    },
    /// OAUTHBEARER: `n,a=<user>,\x01auth=Bearer <token>\x01\x01`.
    OAuthBearer {
        /// User email address.
        user: String,
        /// `OAuth2` access token.
        token: Secret,
    },
}

impl SaslMechanism {
    /// PLAIN without an authorization identity.
    #[must_use]
    pub fn plain(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self::Plain {
            authzid: None,
            username: username.into(),
            password: password.into(),
        }
    }

    /// XOAUTH2 with a bearer token.
    #[must_use]
    pub fn xoauth2(user: impl Into<String>, token: impl Into<Secret>) -> Self {
        Self::XOAuth2 {
            user: user.into(),
            token: token.into(),
        }
    }

    /// OAUTHBEARER with a bearer token.
    #[must_use]
    pub fn oauthbearer(user: impl Into<String>, token: impl Into<Secret>) -> Self {
        Self::OAuthBearer {
            user: user.into(),
            token: token.into(),
        }
    }

    /// Mechanism name as sent after `AUTHENTICATE`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plain { .. } => "PLAIN",
            Self::XOAuth2 { .. } => "XOAUTH2",
            Self::OAuthBearer { .. } => "OAUTHBEARER",
        }
    }

    /// Base64 client response.
    #[must_use]
    pub fn initial_response(&self) -> String {
        let raw = match self {
            Self::Plain {
                authzid,
                username,
                password,
            } => format!(
                "{}\0{username}\0{}",
                authzid.as_deref().unwrap_or_default(),
                password.expose()
            ),
            Self::XOAuth2 { user, token } => {
                format!("user={user}\x01auth=Bearer {}\x01\x01", token.expose())
            }
            Self::OAuthBearer { user, token } => {
                format!("n,a={user},\x01auth=Bearer {}\x01\x01", token.expose())
            }
        };
        STANDARD.encode(raw.as_bytes())
    }

    /// Login name, for logs.
    #[must_use]
    pub fn user(&self) -> &str {
        match self {
            Self::Plain { username, .. } => username,
            Self::XOAuth2 { user, .. } | Self::OAuthBearer { user, .. } => user,
        }
    }

    /// Wipes the secret part.
    pub fn clear(&mut self) {
        match self {
            Self::Plain { password, .. } => password.clear(),
            Self::XOAuth2 { token, .. } | Self::OAuthBearer { token, .. } => token.clear(),
        }
    }
}

/// Decodes the base64 payload of a `+` continuation line.
///
/// OAuth servers put a JSON error document there when a token is
/// rejected. Returns `None` for an empty or undecodable challenge.
#[must_use]
pub fn decode_challenge(line: &[u8]) -> Option<String> {
    let payload = line.strip_prefix(b"+")?.trim_ascii();
    if payload.is_empty() {
        return None;
    }
    let decoded = STANDARD.decode(payload).ok()?;
    String::from_utf8(decoded).ok()
}
