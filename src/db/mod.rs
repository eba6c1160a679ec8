use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::StoreResult;
use crate::models::{Booking, BookingStatus, Bus, Role, User};

pub mod memory;
pub mod mongodb;

pub use self::memory::MemoryStore;
pub use self::mongodb::MongoDB;

/// Generates a record id in the same hex ObjectId form MongoDB uses.
pub fn new_id() -> String {
    ::mongodb::bson::oid::ObjectId::new().to_hex()
}

/// Raw record access against the managed database.
///
/// Each method is a single select, insert or update. Listings come back in
/// creation order except `list_bookings_by_user`, which is newest first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    /// Fails with `StoreError::Duplicate` when the email is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn list_buses(&self) -> StoreResult<Vec<Bus>>;
    async fn find_bus(&self, id: &str) -> StoreResult<Option<Bus>>;
    async fn list_buses_by_driver(&self, driver_id: &str) -> StoreResult<Vec<Bus>>;
    async fn count_buses(&self) -> StoreResult<u64>;
    async fn insert_bus(&self, bus: &Bus) -> StoreResult<()>;
    /// Returns `false` when no bus with that id exists.
    async fn replace_bus(&self, bus: &Bus) -> StoreResult<bool>;
    async fn clear_buses(&self) -> StoreResult<u64>;

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;
    async fn list_confirmed_bookings(
        &self,
        bus_id: &str,
        travel_date: NaiveDate,
    ) -> StoreResult<Vec<Booking>>;
    /// Confirmed bookings on a bus across every travel date.
    async fn list_confirmed_bookings_for_bus(&self, bus_id: &str) -> StoreResult<Vec<Booking>>;
    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>>;
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;
    /// Returns `false` when no booking with that id exists.
    async fn set_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<bool>;
}
