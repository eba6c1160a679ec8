use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Driver => "DRIVER",
            Role::Admin => "ADMIN",
        }
    }

    /// Maps the `{portal_type}` segment of a login URL to the role it serves.
    pub fn from_portal(portal_type: &str) -> Option<Role> {
        match portal_type.to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "driver" => Some(Role::Driver),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn portal(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }

    pub fn audience(&self) -> &'static str {
        match self {
            Role::User => "passengers",
            Role::Driver => "drivers",
            Role::Admin => "administrators",
        }
    }

    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.portal())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "DRIVER" => Ok(Role::Driver),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A stored account. `password` holds the bcrypt hash, never the plain text.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub exp: usize,
}

#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct UserStatistics {
    pub total_users: usize,
    pub passengers: usize,
    pub drivers: usize,
    pub admins: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_types_map_to_roles() {
        assert_eq!(Role::from_portal("user"), Some(Role::User));
        assert_eq!(Role::from_portal("Driver"), Some(Role::Driver));
        assert_eq!(Role::from_portal("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_portal("conductor"), None);
    }

    #[test]
    fn roles_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Driver).unwrap(), "\"DRIVER\"");
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::User.dashboard_path(), "/user/dashboard");
    }

    #[test]
    fn first_name_is_first_word() {
        let user = User {
            id: "1".into(),
            name: "Rahim Uddin".into(),
            email: "rahim@example.com".into(),
            password: String::new(),
            role: Role::User,
            created_at: Utc::now(),
        };
        assert_eq!(user.first_name(), "Rahim");
    }
}
