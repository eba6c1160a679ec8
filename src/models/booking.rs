use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

/// One reserved seat. Multi-seat requests produce one booking per seat.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub bus_id: String,
    pub seat_number: String,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    pub fn route_display(&self) -> String {
        format!("{} → {}", self.source, self.destination)
    }

    pub fn formatted_date(&self) -> String {
        self.travel_date.format("%B %d, %Y").to_string()
    }

    pub fn formatted_time(&self) -> String {
        self.created_at.format("%I:%M %p").to_string()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BookingResponse {
    pub id: String,
    pub user_id: String,
    pub bus_id: String,
    pub bus_name: String,
    pub seat_number: String,
    pub source: String,
    pub destination: String,
    pub route_display: String,
    pub travel_date: NaiveDate,
    pub formatted_date: String,
    pub formatted_time: String,
    pub price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn new(booking: &Booking, bus_name: Option<&str>) -> Self {
        Self {
            id: booking.id.clone(),
            user_id: booking.user_id.clone(),
            bus_id: booking.bus_id.clone(),
            bus_name: bus_name.unwrap_or("Unknown Bus").to_string(),
            seat_number: booking.seat_number.clone(),
            source: booking.source.clone(),
            destination: booking.destination.clone(),
            route_display: booking.route_display(),
            travel_date: booking.travel_date,
            formatted_date: booking.formatted_date(),
            formatted_time: booking.formatted_time(),
            price: booking.price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateBookingRequest {
    pub bus_id: String,
    #[serde(default)]
    pub seats: Vec<String>,
    pub source: String,
    pub destination: String,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub travel_date: Option<NaiveDate>,
}
