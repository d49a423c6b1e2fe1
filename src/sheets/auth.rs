// src/sheets/auth.rs
//
// Google access tokens for the Sheets API.
//
// Two credential shapes are understood:
// - service-account key (`client_email` + `private_key`): sign an RS256 JWT and
//   exchange it at the token endpoint. Used in CI, where the key comes from
//   GOOGLE_SERVICE_ACCOUNT.
// - authorized-user token file (`refresh_token` + client id/secret): the file a
//   desktop consent flow leaves behind; refreshed with the refresh token.
//
// Tokens are cached until a minute before they expire.

use std::{
    fs,
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::consts::{GOOGLE_SCOPES, GOOGLE_TOKEN_URI};
use crate::config::Secrets;
use crate::core::net;
use crate::error::{Error, Result};

const SERVICE: &str = "Google OAuth";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

impl Credentials {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            Error::auth(format!(
                "unrecognised Google credentials (need a service-account key or a token file with refresh_token): {e}"
            ))
        })
    }

    /// Service account from the environment first, then the credentials file.
    pub fn discover(secrets: &Secrets) -> Result<Self> {
        if let Some(json) = secrets.google_service_account.as_deref().filter(|s| !s.trim().is_empty()) {
            tracing::info!("using service account authentication");
            return Self::from_json(json);
        }
        let path = Path::new(secrets.credentials_file());
        if path.exists() {
            tracing::info!(path = %path.display(), "using stored user credentials");
            return Self::from_json(&fs::read_to_string(path)?);
        }
        Err(Error::config(format!(
            "no Google credentials: set GOOGLE_SERVICE_ACCOUNT or provide {}",
            path.display()
        )))
    }

    fn token_uri(&self) -> &str {
        match self {
            Credentials::ServiceAccount(k) => &k.token_uri,
            Credentials::AuthorizedUser(u) => &u.token_uri,
        }
    }
}

/// Anything that can hand out a bearer token.
pub trait TokenSource {
    fn access_token(&self) -> Result<String>;
}

/// A fixed token, for tests and for callers that already hold one.
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct Cached {
    token: String,
    expires_at: Instant,
}

pub struct GoogleAuth {
    http: Client,
    creds: Credentials,
    cache: Mutex<Option<Cached>>,
}

impl GoogleAuth {
    pub fn new(creds: Credentials) -> Result<Self> {
        Ok(Self { http: net::client()?, creds, cache: Mutex::new(None) })
    }

    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::new(Credentials::discover(secrets)?)
    }

    fn request_token(&self) -> Result<TokenResponse> {
        let form: Vec<(&str, String)> = match &self.creds {
            Credentials::ServiceAccount(key) => {
                vec![("grant_type", JWT_GRANT.to_string()), ("assertion", sign_assertion(key)?)]
            }
            Credentials::AuthorizedUser(user) => vec![
                ("client_id", user.client_id.clone()),
                ("client_secret", user.client_secret.clone()),
                ("refresh_token", user.refresh_token.clone()),
                ("grant_type", "refresh_token".to_string()),
            ],
        };
        let resp = self.http.post(self.creds.token_uri()).form(&form).send()?;
        net::json(SERVICE, resp).map_err(|e| match e {
            Error::Status { status, body, .. } => {
                Error::auth(format!("token endpoint returned {status}: {body}"))
            }
            other => other,
        })
    }
}

impl TokenSource for GoogleAuth {
    fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(c) = cache.as_ref() {
            if c.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(c.token.clone());
            }
        }
        let fresh = self.request_token()?;
        tracing::debug!(expires_in = fresh.expires_in, "obtained Google access token");
        *cache = Some(Cached {
            token: fresh.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(fresh.expires_in),
        });
        Ok(fresh.access_token)
    }
}

/// RS256 JWT asserting the service account for the spreadsheet scopes.
pub fn sign_assertion(key: &ServiceAccountKey) -> Result<String> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: GOOGLE_SCOPES.join(" "),
        aud: &key.token_uri,
        iat,
        exp: iat + 3600,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?)
}
