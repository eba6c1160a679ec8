pub mod auth;
pub mod booking;
pub mod bus;
pub mod user;

// Re-export all the models that are used in other modules
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use booking::{Booking, BookingResponse, BookingStatus, CreateBookingRequest};
pub use bus::{
    AssignDriverRequest, Bus, BusRequest, BusResponse, BusStatus, SearchRequest, Seat,
    SeatDateQuery,
};
pub use user::{Claims, Role, User, UserResponse, UserStatistics};
