use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use log::info;

use crate::config::MAX_SEATS_PER_BOOKING;
use crate::db::new_id;
use crate::errors::{AppError, AppResult, ServiceError};
use crate::models::{Booking, BookingStatus, Bus, CreateBookingRequest, Seat};
use crate::service::Service;

/// Result of a multi-seat booking request: the seats that went through and
/// a message per seat that did not.
#[derive(Debug)]
pub struct BookingOutcome {
    pub bookings: Vec<Booking>,
    pub errors: Vec<String>,
}

impl BookingOutcome {
    pub fn total_price(&self) -> i64 {
        self.bookings.iter().map(|b| b.price).sum()
    }
}

#[derive(Clone)]
pub struct BookingController {
    service: Service,
}

impl BookingController {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub async fn get_user_bookings(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        Ok(self.service.get_bookings_by_user(user_id).await?)
    }

    /// Confirmed bookings only; cancelled tickets never show up here.
    pub async fn get_active_bookings(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        let bookings = self.get_user_bookings(user_id).await?;
        Ok(bookings.into_iter().filter(Booking::is_confirmed).collect())
    }

    /// The booking if it exists and belongs to `user_id`.
    pub async fn get_booking_for_user(&self, booking_id: &str, user_id: &str) -> AppResult<Booking> {
        match self.service.get_booking_by_id(booking_id).await? {
            Some(booking) if booking.user_id == user_id => Ok(booking),
            _ => Err(AppError::NotFound(
                "Booking not found or access denied.".to_string(),
            )),
        }
    }

    pub async fn get_occupied_seats(
        &self,
        bus_id: &str,
        travel_date: NaiveDate,
    ) -> AppResult<HashSet<String>> {
        let bookings = self
            .service
            .get_bus_bookings_for_date(bus_id, travel_date)
            .await?;
        Ok(bookings.into_iter().map(|b| b.seat_number).collect())
    }

    pub async fn get_seat_layout(&self, bus: &Bus, travel_date: NaiveDate) -> AppResult<Vec<Seat>> {
        let occupied = self.get_occupied_seats(&bus.id, travel_date).await?;
        Ok(bus.seat_layout(&occupied))
    }

    /// Books a single seat after checking it exists on the bus.
    pub async fn create_booking(
        &self,
        user_id: &str,
        bus: &Bus,
        seat_number: &str,
        source: &str,
        destination: &str,
        travel_date: NaiveDate,
    ) -> Result<Booking, ServiceError> {
        if !bus.has_seat(seat_number) {
            return Err(ServiceError::Booking(format!(
                "Seat {seat_number} does not exist on this bus."
            )));
        }

        let booking = Booking {
            id: new_id(),
            user_id: user_id.to_string(),
            bus_id: bus.id.clone(),
            seat_number: seat_number.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            travel_date,
            price: bus.price,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.service.create_booking(booking).await
    }

    /// Books every requested seat independently.
    ///
    /// Fails outright only when the request itself is unusable or no seat
    /// could be booked; otherwise per-seat failures come back in
    /// `BookingOutcome::errors`.
    pub async fn create_multiple_bookings(
        &self,
        user_id: &str,
        request: &CreateBookingRequest,
    ) -> AppResult<BookingOutcome> {
        let booking_error = |msg: String| AppError::from(ServiceError::Booking(msg));

        if request.seats.is_empty() {
            return Err(booking_error("Please select at least one seat.".to_string()));
        }
        if request.seats.len() > MAX_SEATS_PER_BOOKING {
            return Err(booking_error(format!(
                "Cannot book more than {MAX_SEATS_PER_BOOKING} seats at once."
            )));
        }

        let bus = self
            .service
            .get_bus_by_id(&request.bus_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bus not found.".to_string()))?;
        if !bus.is_bookable() {
            return Err(booking_error(
                "This bus is not currently accepting bookings.".to_string(),
            ));
        }

        let (source, destination) = (request.source.trim(), request.destination.trim());
        if !bus.is_valid_trip(source, destination) {
            return Err(booking_error(format!(
                "{} does not travel from {} to {}.",
                bus.name, source, destination
            )));
        }

        let today = Utc::now().date_naive();
        let travel_date = request.travel_date.unwrap_or(today);
        if travel_date < today {
            return Err(booking_error("Travel date cannot be in the past.".to_string()));
        }

        let mut outcome = BookingOutcome {
            bookings: Vec::new(),
            errors: Vec::new(),
        };
        let mut requested = HashSet::new();
        for seat_number in &request.seats {
            let seat_number = seat_number.trim();
            if !requested.insert(seat_number) {
                outcome
                    .errors
                    .push(format!("Seat {seat_number} was selected more than once."));
                continue;
            }
            match self
                .create_booking(user_id, &bus, seat_number, source, destination, travel_date)
                .await
            {
                Ok(booking) => outcome.bookings.push(booking),
                Err(e) => outcome.errors.push(e.to_string()),
            }
        }

        if outcome.bookings.is_empty() {
            let first = outcome
                .errors
                .into_iter()
                .next()
                .unwrap_or_else(|| "Failed to create booking.".to_string());
            return Err(booking_error(first));
        }

        info!(
            "User {} booked {} seat(s) on bus {}",
            user_id,
            outcome.bookings.len(),
            bus.id
        );
        Ok(outcome)
    }

    /// Marks the booking cancelled. A cancelled booking is final, so a second
    /// cancel fails with a booking error instead of succeeding silently.
    pub async fn cancel_booking(&self, booking_id: &str, user_id: &str) -> AppResult<Booking> {
        let mut booking = self.get_booking_for_user(booking_id, user_id).await?;
        if booking.is_cancelled() {
            return Err(ServiceError::Booking(
                "This booking has already been cancelled.".to_string(),
            )
            .into());
        }

        if !self.service.cancel_booking(&booking.id).await? {
            return Err(AppError::NotFound(
                "Booking not found or access denied.".to_string(),
            ));
        }

        info!("User {} cancelled booking {}", user_id, booking.id);
        booking.status = BookingStatus::Cancelled;
        Ok(booking)
    }

    /// A user's bookings, each with the bus it was made on when that bus still exists.
    pub async fn get_booking_with_bus(&self, user_id: &str) -> AppResult<Vec<(Booking, Option<Bus>)>> {
        let bookings = self.get_user_bookings(user_id).await?;
        let buses: HashMap<String, Bus> = self
            .service
            .get_all_buses()
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let bus = buses.get(&booking.bus_id).cloned();
                (booking, bus)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusStatus, Role};
    use crate::test_support::{memory_service, seed_bus, seed_user};

    fn request(bus_id: &str, seats: &[&str]) -> CreateBookingRequest {
        CreateBookingRequest {
            bus_id: bus_id.to_string(),
            seats: seats.iter().map(|s| s.to_string()).collect(),
            source: "Uttara".into(),
            destination: "Farmgate".into(),
            travel_date: None,
        }
    }

    #[actix_web::test]
    async fn double_booking_a_seat_fails() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Banani", "Farmgate"]).await;
        let alice = seed_user(&service, "Alice", "alice@example.com", Role::User).await;
        let bob = seed_user(&service, "Bob", "bob@example.com", Role::User).await;

        controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["A1"]))
            .await
            .unwrap();

        let err = controller
            .create_multiple_bookings(&bob.id, &request(&bus.id, &["A1"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Service(ServiceError::Booking(ref m)) if m == "Seat A1 is already booked."
        ));
    }

    #[actix_web::test]
    async fn partial_success_reports_failed_seats() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;
        let alice = seed_user(&service, "Alice", "alice@example.com", Role::User).await;

        controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["B2"]))
            .await
            .unwrap();
        let outcome = controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["B1", "B2", "Z9", "B1"]))
            .await
            .unwrap();

        assert_eq!(outcome.bookings.len(), 1);
        assert_eq!(outcome.bookings[0].seat_number, "B1");
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors.contains(&"Seat B2 is already booked.".to_string()));
        assert!(outcome.errors.contains(&"Seat B1 was selected more than once.".to_string()));
        assert_eq!(outcome.total_price(), bus.price);
    }

    #[actix_web::test]
    async fn request_level_rules_are_booking_errors() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;

        let too_many = request(&bus.id, &["A1", "A2", "A3", "A4", "B1", "B2"]);
        let wrong_way = CreateBookingRequest {
            source: "Farmgate".into(),
            destination: "Uttara".into(),
            ..request(&bus.id, &["A1"])
        };
        let past = CreateBookingRequest {
            travel_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..request(&bus.id, &["A1"])
        };
        for bad in [request(&bus.id, &[]), too_many, wrong_way, past] {
            let err = controller.create_multiple_bookings("u", &bad).await.unwrap_err();
            assert!(matches!(err, AppError::Service(ServiceError::Booking(_))));
        }

        let missing = controller
            .create_multiple_bookings("u", &request("missing", &["A1"]))
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn inactive_bus_is_not_bookable() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let mut bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;
        bus.status = BusStatus::Maintenance;
        service.update_bus(bus.clone()).await.unwrap();

        let err = controller
            .create_multiple_bookings("u", &request(&bus.id, &["A1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Service(ServiceError::Booking(_))));
    }

    #[actix_web::test]
    async fn cancelling_twice_fails_and_frees_the_seat_once() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;
        let alice = seed_user(&service, "Alice", "alice@example.com", Role::User).await;

        let outcome = controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["C3"]))
            .await
            .unwrap();
        let booking = &outcome.bookings[0];
        let today = Utc::now().date_naive();
        assert!(controller.get_occupied_seats(&bus.id, today).await.unwrap().contains("C3"));

        let cancelled = controller.cancel_booking(&booking.id, &alice.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let err = controller.cancel_booking(&booking.id, &alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Service(ServiceError::Booking(_))));

        let stored = controller.get_booking_for_user(&booking.id, &alice.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert!(!controller.get_occupied_seats(&bus.id, today).await.unwrap().contains("C3"));
    }

    #[actix_web::test]
    async fn cancelled_bookings_leave_active_listing() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;
        let alice = seed_user(&service, "Alice", "alice@example.com", Role::User).await;

        let outcome = controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["A1", "A2"]))
            .await
            .unwrap();
        controller
            .cancel_booking(&outcome.bookings[0].id, &alice.id)
            .await
            .unwrap();

        let active = controller.get_active_bookings(&alice.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].seat_number, "A2");
        assert_eq!(controller.get_user_bookings(&alice.id).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn only_the_owner_can_cancel() {
        let service = memory_service();
        let controller = BookingController::new(service.clone());
        let bus = seed_bus(&service, &["Uttara", "Farmgate"]).await;
        let alice = seed_user(&service, "Alice", "alice@example.com", Role::User).await;
        let mallory = seed_user(&service, "Mallory", "mallory@example.com", Role::User).await;

        let outcome = controller
            .create_multiple_bookings(&alice.id, &request(&bus.id, &["A1"]))
            .await
            .unwrap();
        let err = controller
            .cancel_booking(&outcome.bookings[0].id, &mallory.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(controller.get_active_bookings(&alice.id).await.unwrap().len(), 1);
    }
}
