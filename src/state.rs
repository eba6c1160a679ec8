use crate::controllers::{AuthController, BookingController, BusController, UserController};
use crate::service::Service;

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub service: Service,
    pub auth: AuthController,
    pub buses: BusController,
    pub bookings: BookingController,
    pub users: UserController,
}

impl AppState {
    pub fn new(service: Service) -> Self {
        Self {
            auth: AuthController::new(service.clone()),
            buses: BusController::new(service.clone()),
            bookings: BookingController::new(service.clone()),
            users: UserController::new(service.clone()),
            service,
        }
    }
}
