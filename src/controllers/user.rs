use std::collections::HashMap;

use serde::Serialize;

use super::auth::validate_account_input;
use crate::config::ALL_BUS_STOPS;
use crate::errors::{AppError, AppResult, ServiceError};
use crate::models::{
    Booking, BookingResponse, Bus, BusResponse, Role, User, UserResponse, UserStatistics,
};
use crate::service::Service;

#[derive(Serialize)]
pub struct PassengerDashboard {
    pub user: UserResponse,
    pub active_bookings: Vec<BookingResponse>,
    pub cancelled_bookings: Vec<BookingResponse>,
    pub bus_stops: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct DriverDashboard {
    pub user: UserResponse,
    pub assigned_buses: Vec<BusResponse>,
    pub bus_count: usize,
}

#[derive(Serialize)]
pub struct DriverSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub assigned_bus: Option<String>,
}

#[derive(Serialize)]
pub struct AdminDashboard {
    pub user: UserResponse,
    pub buses: Vec<BusResponse>,
    pub drivers: Vec<DriverSummary>,
    pub unassigned_buses: Vec<BusResponse>,
    pub bus_count: usize,
    pub driver_count: usize,
    pub statistics: UserStatistics,
    pub bus_stops: Vec<&'static str>,
}

/// Account management and the per-portal dashboard aggregates.
#[derive(Clone)]
pub struct UserController {
    service: Service,
}

impl UserController {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.service.get_all_users().await?)
    }

    pub async fn get_users_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        Ok(self.service.get_users_by_role(role).await?)
    }

    pub async fn get_all_drivers(&self) -> AppResult<Vec<User>> {
        self.get_users_by_role(Role::Driver).await
    }

    pub async fn get_all_passengers(&self) -> AppResult<Vec<User>> {
        self.get_users_by_role(Role::User).await
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> AppResult<User> {
        self.service
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn create_driver(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        validate_account_input(name, email, password).map_err(ServiceError::Registration)?;
        Ok(self.service.create_driver(name, email, password).await?)
    }

    pub async fn get_user_statistics(&self) -> AppResult<UserStatistics> {
        let users = self.get_all_users().await?;
        let count = |role: Role| users.iter().filter(|u| u.role == role).count();
        Ok(UserStatistics {
            total_users: users.len(),
            passengers: count(Role::User),
            drivers: count(Role::Driver),
            admins: count(Role::Admin),
        })
    }

    /// Drivers with the name of the bus each one is assigned to, if any.
    pub async fn get_driver_summaries(&self) -> AppResult<Vec<DriverSummary>> {
        let drivers = self.get_all_drivers().await?;
        let buses = self.service.get_all_buses().await?;
        let assigned: HashMap<&str, &str> = buses
            .iter()
            .filter_map(|b| b.driver_id.as_deref().map(|d| (d, b.name.as_str())))
            .collect();

        Ok(drivers
            .into_iter()
            .map(|driver| DriverSummary {
                assigned_bus: assigned.get(driver.id.as_str()).map(|s| s.to_string()),
                id: driver.id,
                name: driver.name,
                email: driver.email,
            })
            .collect())
    }

    pub async fn passenger_dashboard(&self, user_id: &str) -> AppResult<PassengerDashboard> {
        let user = self.get_user_by_id(user_id).await?;
        let bookings = self.service.get_bookings_by_user(user_id).await?;
        let bus_names = self.bus_names().await?;

        let (active, cancelled): (Vec<Booking>, Vec<Booking>) =
            bookings.into_iter().partition(Booking::is_confirmed);
        let describe = |list: Vec<Booking>| -> Vec<BookingResponse> {
            list.iter()
                .map(|b| BookingResponse::new(b, bus_names.get(&b.bus_id).map(String::as_str)))
                .collect()
        };

        Ok(PassengerDashboard {
            user: UserResponse::from(&user),
            active_bookings: describe(active),
            cancelled_bookings: describe(cancelled),
            bus_stops: ALL_BUS_STOPS.to_vec(),
        })
    }

    pub async fn driver_dashboard(&self, driver_id: &str) -> AppResult<DriverDashboard> {
        let user = self.get_user_by_id(driver_id).await?;
        let buses = self.service.get_buses_by_driver(driver_id).await?;
        Ok(DriverDashboard {
            user: UserResponse::from(&user),
            bus_count: buses.len(),
            assigned_buses: buses.iter().map(BusResponse::from).collect(),
        })
    }

    pub async fn admin_dashboard(&self, admin_id: &str) -> AppResult<AdminDashboard> {
        let user = self.get_user_by_id(admin_id).await?;
        let buses = self.service.get_all_buses().await?;
        let drivers = self.get_driver_summaries().await?;
        let driver_names: HashMap<&str, &str> = drivers
            .iter()
            .map(|d| (d.id.as_str(), d.name.as_str()))
            .collect();

        let describe = |bus: &Bus| {
            let driver_name = bus
                .driver_id
                .as_deref()
                .and_then(|id| driver_names.get(id))
                .map(|name| name.to_string());
            BusResponse::from(bus).with_driver_name(driver_name)
        };
        let fleet: Vec<BusResponse> = buses.iter().map(describe).collect();
        let unassigned: Vec<BusResponse> = buses
            .iter()
            .filter(|b| !b.has_driver())
            .map(describe)
            .collect();

        Ok(AdminDashboard {
            user: UserResponse::from(&user),
            bus_count: fleet.len(),
            driver_count: drivers.len(),
            buses: fleet,
            unassigned_buses: unassigned,
            statistics: self.get_user_statistics().await?,
            drivers,
            bus_stops: ALL_BUS_STOPS.to_vec(),
        })
    }

    async fn bus_names(&self) -> AppResult<HashMap<String, String>> {
        Ok(self
            .service
            .get_all_buses()
            .await?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect())
    }
}
