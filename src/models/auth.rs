use super::user::UserResponse;
use serde::{Deserialize, Serialize};

/// Used for passenger self-registration and for admin-created driver accounts.
#[derive(Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
    pub redirect: String,
    pub message: String,
}
