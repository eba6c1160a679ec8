use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::Store;
use crate::errors::{StoreError, StoreResult};
use crate::models::{Booking, BookingStatus, Bus, Role, User};

/// Process-local store for tests and `STORE=memory` development runs.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    buses: Mutex<Vec<Bus>>,
    bookings: Mutex<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(lock(&self.users)?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(lock(&self.users)?
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = lock(&self.users)?
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = lock(&self.users)?;
        if users.iter().any(|u| u.email == user.email || u.id == user.id) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn list_buses(&self) -> StoreResult<Vec<Bus>> {
        let mut buses = lock(&self.buses)?.clone();
        buses.sort_by_key(|b| b.created_at);
        Ok(buses)
    }

    async fn find_bus(&self, id: &str) -> StoreResult<Option<Bus>> {
        Ok(lock(&self.buses)?.iter().find(|b| b.id == id).cloned())
    }

    async fn list_buses_by_driver(&self, driver_id: &str) -> StoreResult<Vec<Bus>> {
        let mut buses: Vec<Bus> = lock(&self.buses)?
            .iter()
            .filter(|b| b.driver_id.as_deref() == Some(driver_id))
            .cloned()
            .collect();
        buses.sort_by_key(|b| b.created_at);
        Ok(buses)
    }

    async fn count_buses(&self) -> StoreResult<u64> {
        Ok(lock(&self.buses)?.len() as u64)
    }

    async fn insert_bus(&self, bus: &Bus) -> StoreResult<()> {
        let mut buses = lock(&self.buses)?;
        if buses.iter().any(|b| b.id == bus.id) {
            return Err(StoreError::Duplicate(format!("bus {}", bus.id)));
        }
        buses.push(bus.clone());
        Ok(())
    }

    async fn replace_bus(&self, bus: &Bus) -> StoreResult<bool> {
        let mut buses = lock(&self.buses)?;
        match buses.iter_mut().find(|b| b.id == bus.id) {
            Some(existing) => {
                *existing = bus.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_buses(&self) -> StoreResult<u64> {
        let mut buses = lock(&self.buses)?;
        let removed = buses.len() as u64;
        buses.clear();
        Ok(removed)
    }

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = lock(&self.bookings)?
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn list_confirmed_bookings(
        &self,
        bus_id: &str,
        travel_date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        Ok(lock(&self.bookings)?
            .iter()
            .filter(|b| b.bus_id == bus_id && b.travel_date == travel_date && b.is_confirmed())
            .cloned()
            .collect())
    }

    async fn list_confirmed_bookings_for_bus(&self, bus_id: &str) -> StoreResult<Vec<Booking>> {
        Ok(lock(&self.bookings)?
            .iter()
            .filter(|b| b.bus_id == bus_id && b.is_confirmed())
            .cloned()
            .collect())
    }

    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(lock(&self.bookings)?.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        lock(&self.bookings)?.push(booking.clone());
        Ok(())
    }

    async fn set_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<bool> {
        let mut bookings = lock(&self.bookings)?;
        match bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) => {
                booking.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
