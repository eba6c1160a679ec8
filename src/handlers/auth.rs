use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::state::AppState;

pub async fn login(
    state: web::Data<AppState>,
    path: web::Path<String>,
    credentials: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let portal_type = path.into_inner();
    let (user, token) = state
        .auth
        .login(&credentials.email, &credentials.password, &portal_type)
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        redirect: user.role.dashboard_path(),
        message: format!("Welcome back, {}!", user.first_name()),
        user: UserResponse::from(&user),
    }))
}

pub async fn register(
    state: web::Data<AppState>,
    user: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .auth
        .register(&user.name, &user.email, &user.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Account created successfully! Please log in.",
        "user": UserResponse::from(&user),
        "login": "/auth/login/user",
    })))
}

pub async fn logout(state: web::Data<AppState>, identity: Option<Identity>) -> HttpResponse {
    state.auth.logout(identity.as_ref().map(|i| i.id.as_str()));
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "You have been logged out.",
    }))
}
