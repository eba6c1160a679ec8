use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use log::{error, info, warn};

use crate::auth::TokenKeys;
use crate::config::{AdminAccount, ALL_BUS_STOPS, DEFAULT_TOTAL_SEATS};
use crate::db::{new_id, Store};
use crate::errors::{ServiceError, StoreError};
use crate::models::{Booking, BookingStatus, Bus, BusStatus, Claims, Role, User};

/// Wraps the managed database and the credential checks around it.
///
/// Every method is one store round trip (two for the seat check in
/// `create_booking`) and fails with one of the four `ServiceError` kinds.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn Store>,
    tokens: TokenKeys,
    bcrypt_cost: u32,
}

impl Service {
    pub fn new(store: Arc<dyn Store>, tokens: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    // Authentication

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let invalid = || ServiceError::Authentication("Invalid email or password.".to_string());

        let user = self
            .store
            .find_user_by_email(&normalize_email(email))
            .await
            .map_err(|e| ServiceError::Authentication(e.to_string()))?
            .ok_or_else(invalid)?;

        let verified = bcrypt::verify(password, &user.password).map_err(|e| {
            error!("Bcrypt verification error: {}", e);
            invalid()
        })?;
        if !verified {
            warn!("Invalid password attempt for email: {}", user.email);
            return Err(invalid());
        }

        info!("User {} authenticated successfully", user.email);
        Ok(user)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        let already_registered =
            || ServiceError::Registration("This email is already registered.".to_string());

        let existing = self
            .store
            .find_user_by_email(&email)
            .await
            .map_err(|e| ServiceError::Registration(e.to_string()))?;
        if existing.is_some() {
            return Err(already_registered());
        }

        let password = bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|e| ServiceError::Registration(format!("Failed to secure password: {e}")))?;

        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            email,
            password,
            role,
            created_at: Utc::now(),
        };

        match self.store.insert_user(&user).await {
            Ok(()) => {
                info!("Registered {} account for {}", role, user.email);
                Ok(user)
            }
            Err(StoreError::Duplicate(_)) => Err(already_registered()),
            Err(e) => Err(ServiceError::Registration(e.to_string())),
        }
    }

    pub async fn create_driver(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        self.register(name, email, password, Role::Driver).await
    }

    pub fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        self.tokens.issue(user).map_err(|e| {
            error!("JWT encoding error: {}", e);
            ServiceError::Authentication("Could not start a session. Please try again.".to_string())
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        self.tokens
            .verify(token)
            .map_err(|e| ServiceError::Authentication(e.to_string()))
    }

    // Users

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.store.find_user(user_id).await?)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users(None).await?)
    }

    pub async fn get_users_by_role(&self, role: Role) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users(Some(role)).await?)
    }

    // Buses

    pub async fn get_all_buses(&self) -> Result<Vec<Bus>, ServiceError> {
        Ok(self.store.list_buses().await?)
    }

    pub async fn get_bus_by_id(&self, bus_id: &str) -> Result<Option<Bus>, ServiceError> {
        Ok(self.store.find_bus(bus_id).await?)
    }

    pub async fn get_buses_by_driver(&self, driver_id: &str) -> Result<Vec<Bus>, ServiceError> {
        Ok(self.store.list_buses_by_driver(driver_id).await?)
    }

    pub async fn create_bus(&self, bus: Bus) -> Result<Bus, ServiceError> {
        self.store
            .insert_bus(&bus)
            .await
            .map_err(|e| ServiceError::DatabaseOperation(format!("Failed to create bus: {e}")))?;
        info!("Created bus {} ({})", bus.name, bus.id);
        Ok(bus)
    }

    /// Returns `None` when the bus no longer exists.
    pub async fn update_bus(&self, bus: Bus) -> Result<Option<Bus>, ServiceError> {
        let updated = self
            .store
            .replace_bus(&bus)
            .await
            .map_err(|e| ServiceError::DatabaseOperation(format!("Failed to update bus: {e}")))?;
        Ok(updated.then_some(bus))
    }

    // Bookings

    pub async fn get_bookings_by_user(&self, user_id: &str) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.store.list_bookings_by_user(user_id).await?)
    }

    pub async fn get_bus_bookings_for_date(
        &self,
        bus_id: &str,
        travel_date: NaiveDate,
    ) -> Result<Vec<Booking>, ServiceError> {
        Ok(self
            .store
            .list_confirmed_bookings(bus_id, travel_date)
            .await?)
    }

    pub async fn get_confirmed_bookings_for_bus(
        &self,
        bus_id: &str,
    ) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.store.list_confirmed_bookings_for_bus(bus_id).await?)
    }

    pub async fn get_booking_by_id(&self, booking_id: &str) -> Result<Option<Booking>, ServiceError> {
        Ok(self.store.find_booking(booking_id).await?)
    }

    /// Inserts the booking unless a confirmed booking already holds the seat.
    ///
    /// The check and the insert are separate store calls, so two concurrent
    /// requests for the same seat can both succeed.
    pub async fn create_booking(&self, booking: Booking) -> Result<Booking, ServiceError> {
        let failed = |e: StoreError| ServiceError::Booking(format!("Failed to create booking: {e}"));

        let existing = self
            .store
            .list_confirmed_bookings(&booking.bus_id, booking.travel_date)
            .await
            .map_err(failed)?;
        if existing.iter().any(|b| b.seat_number == booking.seat_number) {
            return Err(ServiceError::Booking(format!(
                "Seat {} is already booked.",
                booking.seat_number
            )));
        }

        self.store.insert_booking(&booking).await.map_err(failed)?;
        info!(
            "Booked seat {} on bus {} for {}",
            booking.seat_number, booking.bus_id, booking.travel_date
        );
        Ok(booking)
    }

    /// Flips the booking to cancelled. Returns `false` when it does not exist.
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<bool, ServiceError> {
        Ok(self
            .store
            .set_booking_status(booking_id, BookingStatus::Cancelled)
            .await?)
    }

    // Startup data

    /// Creates the configured administrator unless the email is already taken.
    pub async fn ensure_admin(&self, admin: &AdminAccount) -> Result<(), ServiceError> {
        let existing = self
            .store
            .find_user_by_email(&normalize_email(&admin.email))
            .await?;
        match existing {
            Some(user) if user.role == Role::Admin => Ok(()),
            Some(user) => {
                warn!(
                    "Bootstrap admin email {} belongs to a {} account, skipping",
                    user.email, user.role
                );
                Ok(())
            }
            None => {
                self.register(&admin.name, &admin.email, &admin.password, Role::Admin)
                    .await?;
                info!("Created bootstrap administrator {}", admin.email);
                Ok(())
            }
        }
    }

    pub async fn seed_data(&self, force: bool) -> Result<(), ServiceError> {
        if force {
            let removed = self.store.clear_buses().await?;
            info!("Force seeding enabled, removed {} buses", removed);
        }

        if self.store.count_buses().await? > 0 {
            return Ok(());
        }

        let fleet = sample_fleet();
        let count = fleet.len();
        for bus in fleet {
            self.store.insert_bus(&bus).await?;
        }
        info!("Seeded {} sample buses", count);
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn sample_fleet() -> Vec<Bus> {
    let routes: [(&str, &[&str], i64); 4] = [
        (
            "Red Express 01",
            &["Uttara", "Banani", "Mohakhali", "Farmgate", "Shahbagh", "Motijheel"],
            50,
        ),
        (
            "Green Line 07",
            &["Gabtoli", "Mirpur 1", "Shyamoli", "Kolabagan", "Science Lab", "New Market"],
            40,
        ),
        (
            "Airport Shuttle",
            &["Airport", "Uttara", "Banani", "Mohakhali", "Karwan Bazar", "Gulistan"],
            80,
        ),
        ("City Loop 03", &["Motijheel", "Gulistan", "Shahbagh", "Farmgate"], 30),
    ];

    routes
        .iter()
        .map(|(name, stops, price)| {
            debug_assert!(stops.iter().all(|s| ALL_BUS_STOPS.contains(s)));
            Bus {
                id: new_id(),
                name: name.to_string(),
                route: stops.iter().map(|s| s.to_string()).collect(),
                total_seats: DEFAULT_TOTAL_SEATS,
                price: *price,
                status: BusStatus::Active,
                driver_id: None,
                created_at: Utc::now(),
            }
        })
        .collect()
}
