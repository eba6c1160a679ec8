use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};
use thiserror::Error;

pub const MAX_SEATS_PER_BOOKING: usize = 5;
pub const DEFAULT_TOTAL_SEATS: i32 = 40;
pub const MAX_TOTAL_SEATS: i32 = 100;
pub const DEFAULT_TICKET_PRICE: i64 = 50;
pub const SEATS_PER_ROW: i32 = 4;

const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Every stop served by the network, in the order shown on the search form.
pub const ALL_BUS_STOPS: [&str; 15] = [
    "Gabtoli",
    "Mirpur 1",
    "Shyamoli",
    "Kolabagan",
    "Farmgate",
    "Karwan Bazar",
    "Shahbagh",
    "Science Lab",
    "New Market",
    "Motijheel",
    "Gulistan",
    "Mohakhali",
    "Banani",
    "Uttara",
    "Airport",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreKind::Mongo),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store {other}, expected mongo or memory")),
        }
    }
}

/// Credentials for the administrator account created at startup.
#[derive(Clone, Debug)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminAccount>,
    pub seed_data: bool,
    pub force_seed: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, falling back to an insecure development secret");
            "secret".to_string()
        });

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminAccount {
                name: var_or("ADMIN_NAME", "Administrator"),
                email,
                password,
            }),
            _ => None,
        };

        let config = Config {
            host: var_or("HOST", "127.0.0.1"),
            port: parse_var("PORT", 8080)?,
            store: parse_var("STORE", StoreKind::Mongo)?,
            mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
            database_name: var_or("DATABASE_NAME", "busflow"),
            jwt_secret,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 168)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            admin,
            seed_data: parse_var("SEED_DATA", false)?,
            force_seed: parse_var("FORCE_SEED", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks for values that parse but cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_hours < 1 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: self.token_ttl_hours.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
                reason: format!(
                    "must be between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }
        Ok(())
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }),
        Err(_) => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
