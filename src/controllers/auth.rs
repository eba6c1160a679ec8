use log::info;

use crate::errors::{AppError, AppResult, ServiceError};
use crate::models::{Role, User};
use crate::service::Service;

/// Login, registration and portal-role checks.
#[derive(Clone)]
pub struct AuthController {
    service: Service,
}

impl AuthController {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// Signs the user in through `portal_type` and returns them with a session token.
    ///
    /// A passenger cannot enter the driver portal and so on; a role mismatch
    /// is reported as an authentication failure.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        portal_type: &str,
    ) -> AppResult<(User, String)> {
        let expected_role = Role::from_portal(portal_type)
            .ok_or_else(|| AppError::NotFound("Invalid portal type.".to_string()))?;

        if email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Authentication(
                "Please enter both email and password.".to_string(),
            )
            .into());
        }

        let user = self.service.login(email, password).await?;
        if user.role != expected_role {
            return Err(ServiceError::Authentication(format!(
                "Access denied. This portal is for {}s only.",
                expected_role.portal()
            ))
            .into());
        }

        let token = self.service.issue_token(&user)?;
        Ok((user, token))
    }

    /// Self-registration is for passengers only; drivers are created by admins.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        validate_account_input(name, email, password).map_err(ServiceError::Registration)?;
        Ok(self
            .service
            .register(name, email, password, Role::User)
            .await?)
    }

    /// Tokens are stateless; logging out only needs to be recorded.
    pub fn logout(&self, user_id: Option<&str>) {
        match user_id {
            Some(id) => info!("User {} logged out", id),
            None => info!("Anonymous logout request"),
        }
    }
}

/// Shape checks shared by passenger registration and driver creation.
pub(crate) fn validate_account_input(name: &str, email: &str, password: &str) -> Result<(), String> {
    if name.trim().chars().count() < 2 {
        return Err("Name must be at least 2 characters long.".to_string());
    }
    if !email.contains('@') {
        return Err("Please enter a valid email address.".to_string());
    }
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long.".to_string());
    }
    Ok(())
}
