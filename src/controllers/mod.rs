pub mod auth;
pub mod booking;
pub mod bus;
pub mod user;

pub use auth::AuthController;
pub use booking::{BookingController, BookingOutcome};
pub use bus::BusController;
pub use user::UserController;
