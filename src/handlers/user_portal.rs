use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::{
    BookingResponse, BookingStatus, BusResponse, CreateBookingRequest, Role, SearchRequest, SeatDateQuery,
};
use crate::state::AppState;

pub async fn dashboard(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let dashboard = state.users.passenger_dashboard(&identity.id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

pub async fn search_buses(
    state: web::Data<AppState>,
    identity: Identity,
    search: web::Json<SearchRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let buses = state
        .buses
        .search_buses(&search.source, &search.destination)
        .await?;
    let buses: Vec<BusResponse> = buses.iter().map(BusResponse::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "count": buses.len(),
        "buses": buses,
        "source": search.source.trim(),
        "destination": search.destination.trim(),
    })))
}

pub async fn get_seats(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    query: web::Query<SeatDateQuery>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let bus = state.buses.get_bus_by_id(&path.into_inner()).await?;
    let travel_date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let seats = state.bookings.get_seat_layout(&bus, travel_date).await?;

    Ok(HttpResponse::Ok().json(json!({
        "bus": {
            "id": bus.id,
            "name": bus.name,
            "price": bus.price,
            "route": bus.route,
        },
        "travel_date": travel_date,
        "available": seats.iter().filter(|s| s.is_available).count(),
        "seats": seats,
    })))
}

pub async fn create_booking(
    state: web::Data<AppState>,
    identity: Identity,
    booking_req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let outcome = state
        .bookings
        .create_multiple_bookings(&identity.id, &booking_req)
        .await?;

    let bus = state.buses.get_bus_by_id(&booking_req.bus_id).await.ok();
    let bus_name = bus.as_ref().map(|b| b.name.as_str());
    let bookings: Vec<BookingResponse> = outcome
        .bookings
        .iter()
        .map(|b| BookingResponse::new(b, bus_name))
        .collect();

    let mut body = json!({
        "success": true,
        "message": format!("Successfully booked {} seat(s).", bookings.len()),
        "total_price": outcome.total_price(),
        "bookings": bookings,
    });
    if !outcome.errors.is_empty() {
        body["partial_errors"] = json!(outcome.errors);
    }
    Ok(HttpResponse::Created().json(body))
}

pub async fn get_user_bookings(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let bookings: Vec<BookingResponse> = state
        .bookings
        .get_booking_with_bus(&identity.id)
        .await?
        .iter()
        .map(|(booking, bus)| BookingResponse::new(booking, bus.as_ref().map(|b| b.name.as_str())))
        .collect();
    let active_count = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();

    Ok(HttpResponse::Ok().json(json!({
        "count": bookings.len(),
        "active_count": active_count,
        "bookings": bookings,
    })))
}

pub async fn get_booking_detail(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let booking = state
        .bookings
        .get_booking_for_user(&path.into_inner(), &identity.id)
        .await?;
    let bus = state.buses.get_bus_by_id(&booking.bus_id).await.ok();

    Ok(HttpResponse::Ok().json(json!({
        "booking": BookingResponse::new(&booking, bus.as_ref().map(|b| b.name.as_str())),
    })))
}

pub async fn cancel_booking(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::User)?;
    let booking = state
        .bookings
        .cancel_booking(&path.into_inner(), &identity.id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Ticket cancelled successfully.",
        "booking": BookingResponse::new(&booking, None),
    })))
}
