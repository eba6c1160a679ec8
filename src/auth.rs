use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{Claims, Role, User};
use crate::state::AppState;

/// HS256 signing material for session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    secret: String,
    ttl_hours: i64,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let expiration = chrono::Utc::now() + chrono::Duration::hours(self.ttl_hours);
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            name: user.name.clone(),
            exp: expiration.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

/// The caller behind a request's `Authorization: Bearer` token.
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: String,
    pub role: Role,
    pub name: String,
}

impl Identity {
    /// Rejects callers whose role does not own the portal being accessed.
    pub fn require(&self, role: Role) -> AppResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Access denied. This portal is for {} only.",
                role.audience()
            )))
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            name: claims.name,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization");
    if header.is_none() {
        debug!("Missing Authorization header");
    }
    let token = header
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    if header.is_some() && token.is_none() {
        debug!("Invalid Authorization header format");
    }
    token
}

fn identify(req: &HttpRequest) -> AppResult<Identity> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;

    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("Please log in to access this page.".to_string()))?;

    let claims = state.service.verify_token(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        AppError::Unauthorized("Your session is invalid or has expired. Please log in again.".to_string())
    })?;

    debug!("Token decoded successfully for user: {}", claims.sub);
    Ok(claims.into())
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req))
    }
}
