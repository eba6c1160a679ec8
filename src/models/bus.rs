use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_TICKET_PRICE, SEATS_PER_ROW};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BusStatus {
    #[default]
    Active,
    Maintenance,
    Decommissioned,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Bus {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Ordered stops; the first is where the bus starts, the last where it ends.
    pub route: Vec<String>,
    pub total_seats: i32,
    pub price: i64,
    pub status: BusStatus,
    #[serde(default)]
    pub driver_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bus {
    pub fn is_active(&self) -> bool {
        self.status == BusStatus::Active
    }

    pub fn has_driver(&self) -> bool {
        self.driver_id.is_some()
    }

    pub fn start_stop(&self) -> &str {
        self.route.first().map(String::as_str).unwrap_or("")
    }

    pub fn end_stop(&self) -> &str {
        self.route.last().map(String::as_str).unwrap_or("")
    }

    pub fn route_display(&self) -> String {
        self.route.join(" → ")
    }

    /// Passengers can only book active buses that actually go somewhere.
    pub fn is_bookable(&self) -> bool {
        self.is_active() && self.route.len() >= 2
    }

    /// A trip is valid when both stops are on the route and `source` comes first.
    pub fn is_valid_trip(&self, source: &str, destination: &str) -> bool {
        let position = |stop: &str| self.route.iter().position(|s| s == stop);
        match (position(source), position(destination)) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }

    pub fn has_seat(&self, seat_number: &str) -> bool {
        seat_positions(self.total_seats)
            .iter()
            .any(|p| p.label() == seat_number)
    }

    pub fn seat_layout(&self, occupied: &HashSet<String>) -> Vec<Seat> {
        seat_positions(self.total_seats)
            .into_iter()
            .map(|p| {
                let seat_number = p.label();
                Seat {
                    is_available: !occupied.contains(&seat_number),
                    seat_number,
                    row: p.row.to_string(),
                    position: p.position,
                    is_last_row: p.last_row,
                }
            })
            .collect()
    }
}

struct SeatPosition {
    row: char,
    position: i32,
    last_row: bool,
}

impl SeatPosition {
    fn label(&self) -> String {
        format!("{}{}", self.row, self.position)
    }
}

/// Rows of four from `A`; a single leftover seat widens the last row into a
/// five-seat bench, any other remainder forms a short final row.
fn seat_positions(total_seats: i32) -> Vec<SeatPosition> {
    let total = total_seats.max(0);
    let full_rows = total / SEATS_PER_ROW;
    let remainder = total % SEATS_PER_ROW;

    let mut row_sizes = Vec::new();
    if remainder == 1 && full_rows > 0 {
        row_sizes.extend(std::iter::repeat(SEATS_PER_ROW).take(full_rows as usize - 1));
        row_sizes.push(SEATS_PER_ROW + 1);
    } else {
        row_sizes.extend(std::iter::repeat(SEATS_PER_ROW).take(full_rows as usize));
        if remainder > 0 {
            row_sizes.push(remainder);
        }
    }

    let last = row_sizes.len().saturating_sub(1);
    row_sizes
        .iter()
        .enumerate()
        .flat_map(|(index, &size)| {
            let row = (b'A' + index as u8) as char;
            (1..=size).map(move |position| SeatPosition {
                row,
                position,
                last_row: index == last,
            })
        })
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Seat {
    pub seat_number: String,
    pub row: String,
    pub position: i32,
    pub is_available: bool,
    pub is_last_row: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BusResponse {
    pub id: String,
    pub name: String,
    pub route: Vec<String>,
    pub route_display: String,
    pub start_stop: String,
    pub end_stop: String,
    pub stop_count: usize,
    pub total_seats: i32,
    pub price: i64,
    pub status: BusStatus,
    pub driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
}

impl From<&Bus> for BusResponse {
    fn from(bus: &Bus) -> Self {
        Self {
            id: bus.id.clone(),
            name: bus.name.clone(),
            route: bus.route.clone(),
            route_display: bus.route_display(),
            start_stop: bus.start_stop().to_string(),
            end_stop: bus.end_stop().to_string(),
            stop_count: bus.route.len(),
            total_seats: bus.total_seats,
            price: bus.price,
            status: bus.status,
            driver_id: bus.driver_id.clone(),
            driver_name: None,
        }
    }
}

impl BusResponse {
    pub fn with_driver_name(mut self, driver_name: Option<String>) -> Self {
        self.driver_name = driver_name;
        self
    }
}

fn default_price() -> i64 {
    DEFAULT_TICKET_PRICE
}

/// Body of `/admin/bus/create` and `/admin/bus/{id}/update`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BusRequest {
    pub name: String,
    #[serde(default)]
    pub route: Vec<String>,
    #[serde(default = "default_price")]
    pub price: i64,
    #[serde(default)]
    pub total_seats: Option<i32>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub status: BusStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AssignDriverRequest {
    #[serde(default)]
    pub driver_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SearchRequest {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

#[derive(Deserialize)]
pub struct SeatDateQuery {
    pub date: Option<NaiveDate>,
}
