#![cfg(test)]
use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::db::MemoryStore;
use crate::models::{Bus, BusRequest, BusStatus, Role, User};
use crate::service::Service;

// Minimum bcrypt cost keeps hashing fast in tests.
const TEST_BCRYPT_COST: u32 = 4;

pub fn memory_service() -> Service {
    Service::new(
        Arc::new(MemoryStore::new()),
        TokenKeys::new("test-secret", 1),
        TEST_BCRYPT_COST,
    )
}

pub async fn seed_user(service: &Service, name: &str, email: &str, role: Role) -> User {
    service
        .register(name, email, "secret1", role)
        .await
        .expect("seed user")
}

pub fn bus_request(name: &str, route: &[&str]) -> BusRequest {
    BusRequest {
        name: name.to_string(),
        route: route.iter().map(|s| s.to_string()).collect(),
        price: 50,
        total_seats: None,
        driver_id: None,
        status: BusStatus::Active,
    }
}

pub async fn seed_bus(service: &Service, route: &[&str]) -> Bus {
    let name = format!("{} Express", route.first().copied().unwrap_or("City"));
    crate::controllers::BusController::new(service.clone())
        .create_bus(&bus_request(&name, route))
        .await
        .expect("seed bus")
}
