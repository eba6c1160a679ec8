use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::config::{DEFAULT_TOTAL_SEATS, MAX_TOTAL_SEATS};
use crate::db::new_id;
use crate::errors::{AppError, AppResult};
use crate::models::{Bus, BusRequest, Role, User};
use crate::service::Service;

/// Fleet management, route search and driver assignment.
#[derive(Clone)]
pub struct BusController {
    service: Service,
}

impl BusController {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub async fn get_all_buses(&self) -> AppResult<Vec<Bus>> {
        Ok(self.service.get_all_buses().await?)
    }

    pub async fn get_bus_by_id(&self, bus_id: &str) -> AppResult<Bus> {
        self.service
            .get_bus_by_id(bus_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bus not found.".to_string()))
    }

    pub async fn get_buses_for_driver(&self, driver_id: &str) -> AppResult<Vec<Bus>> {
        Ok(self.service.get_buses_by_driver(driver_id).await?)
    }

    pub async fn get_active_buses(&self) -> AppResult<Vec<Bus>> {
        let buses = self.get_all_buses().await?;
        Ok(buses.into_iter().filter(Bus::is_active).collect())
    }

    pub async fn get_unassigned_buses(&self) -> AppResult<Vec<Bus>> {
        let buses = self.get_all_buses().await?;
        Ok(buses.into_iter().filter(|b| !b.has_driver()).collect())
    }

    /// Active buses whose route visits `source` before `destination`.
    pub async fn search_buses(&self, source: &str, destination: &str) -> AppResult<Vec<Bus>> {
        let (source, destination) = (source.trim(), destination.trim());
        if source.is_empty() || destination.is_empty() {
            return Err(AppError::Validation(
                "Please select both source and destination.".to_string(),
            ));
        }
        if source == destination {
            return Err(AppError::Validation(
                "Source and destination cannot be the same.".to_string(),
            ));
        }

        let buses = self.get_active_buses().await?;
        Ok(buses
            .into_iter()
            .filter(|b| b.is_valid_trip(source, destination))
            .collect())
    }

    pub async fn create_bus(&self, request: &BusRequest) -> AppResult<Bus> {
        validate_bus_input(request).map_err(AppError::Validation)?;
        let driver_id = self.checked_driver_id(request.driver_id.as_deref()).await?;

        let bus = Bus {
            id: new_id(),
            name: request.name.trim().to_string(),
            route: clean_route(&request.route),
            total_seats: request.total_seats.unwrap_or(DEFAULT_TOTAL_SEATS),
            price: request.price,
            status: request.status,
            driver_id,
            created_at: Utc::now(),
        };
        Ok(self.service.create_bus(bus).await?)
    }

    /// Overwrites name, route, price, status and driver; capacity only when given.
    pub async fn update_bus(&self, bus_id: &str, request: &BusRequest) -> AppResult<Bus> {
        validate_bus_input(request).map_err(AppError::Validation)?;
        let mut bus = self.get_bus_by_id(bus_id).await?;
        let driver_id = self.checked_driver_id(request.driver_id.as_deref()).await?;

        bus.name = request.name.trim().to_string();
        bus.route = clean_route(&request.route);
        bus.price = request.price;
        bus.status = request.status;
        bus.driver_id = driver_id;
        if let Some(total_seats) = request.total_seats {
            if total_seats < bus.total_seats {
                self.check_capacity_reduction(&bus, total_seats).await?;
            }
            bus.total_seats = total_seats;
        }

        self.service
            .update_bus(bus)
            .await?
            .ok_or_else(|| AppError::NotFound("Bus not found.".to_string()))
    }

    pub async fn assign_driver(&self, bus_id: &str, driver_id: &str) -> AppResult<Bus> {
        let mut bus = self.get_bus_by_id(bus_id).await?;
        let driver = self.validate_driver(driver_id).await?;
        bus.driver_id = Some(driver.id);

        self.service
            .update_bus(bus)
            .await?
            .ok_or_else(|| AppError::NotFound("Bus not found.".to_string()))
    }

    /// The user must exist and hold the driver role.
    pub async fn validate_driver(&self, driver_id: &str) -> AppResult<User> {
        let user = self
            .service
            .get_user_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::Validation("Driver not found.".to_string()))?;
        if user.role != Role::Driver {
            return Err(AppError::Validation(format!(
                "{} is not a driver and cannot be assigned to a bus.",
                user.name
            )));
        }
        Ok(user)
    }

    /// Every bus paired with its assigned driver, if that driver still exists.
    pub async fn get_bus_with_driver_info(&self) -> AppResult<Vec<(Bus, Option<User>)>> {
        let buses = self.get_all_buses().await?;
        let drivers: HashMap<String, User> = self
            .service
            .get_users_by_role(Role::Driver)
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        Ok(buses
            .into_iter()
            .map(|bus| {
                let driver = bus
                    .driver_id
                    .as_ref()
                    .and_then(|id| drivers.get(id).cloned());
                (bus, driver)
            })
            .collect())
    }

    /// A bus cannot shrink below a seat that still holds a confirmed booking.
    async fn check_capacity_reduction(&self, bus: &Bus, total_seats: i32) -> AppResult<()> {
        let resized = Bus {
            total_seats,
            ..bus.clone()
        };
        let bookings = self.service.get_confirmed_bookings_for_bus(&bus.id).await?;
        let mut stranded: Vec<&str> = bookings
            .iter()
            .map(|b| b.seat_number.as_str())
            .filter(|seat| !resized.has_seat(seat))
            .collect();
        if stranded.is_empty() {
            return Ok(());
        }

        stranded.sort_unstable();
        stranded.dedup();
        Err(AppError::Validation(format!(
            "Cannot reduce capacity to {} seats: seat(s) {} have confirmed bookings.",
            total_seats,
            stranded.join(", ")
        )))
    }

    async fn checked_driver_id(&self, driver_id: Option<&str>) -> AppResult<Option<String>> {
        match driver_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Ok(Some(self.validate_driver(id).await?.id)),
            None => Ok(None),
        }
    }
}

fn clean_route(route: &[String]) -> Vec<String> {
    route.iter().map(|s| s.trim().to_string()).collect()
}

fn validate_bus_input(request: &BusRequest) -> Result<(), String> {
    if request.name.trim().chars().count() < 2 {
        return Err("Bus name must be at least 2 characters.".to_string());
    }
    let route = clean_route(&request.route);
    if route.len() < 2 {
        return Err("Route must have at least 2 stops.".to_string());
    }
    if route.iter().any(String::is_empty) {
        return Err("Route stops cannot be blank.".to_string());
    }
    let mut seen = HashSet::new();
    if !route.iter().all(|stop| seen.insert(stop.as_str())) {
        return Err("Route cannot visit the same stop twice.".to_string());
    }
    if request.price <= 0 {
        return Err("Price must be greater than 0.".to_string());
    }
    if let Some(total_seats) = request.total_seats {
        if !(1..=MAX_TOTAL_SEATS).contains(&total_seats) {
            return Err(format!(
                "Total seats must be between 1 and {MAX_TOTAL_SEATS}."
            ));
        }
    }
    Ok(())
}
