pub mod admin_portal;
pub mod auth;
pub mod driver_portal;
pub mod landing;
pub mod user_portal;

use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, HttpRequest,
};

use crate::errors::AppError;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid query string: {}", err)).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid path: {}", err)).into()
}

/// Registers every route of the three portals.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/", web::get().to(landing::index))
        .service(
            web::scope("/auth")
                .route("/login/{portal_type}", web::post().to(auth::login))
                .route("/register", web::post().to(auth::register))
                .route("/logout", web::get().to(auth::logout))
                .route("/logout", web::post().to(auth::logout)),
        )
        .service(
            web::scope("/user")
                .route("/dashboard", web::get().to(user_portal::dashboard))
                .route("/search", web::post().to(user_portal::search_buses))
                .route("/seats/{bus_id}", web::get().to(user_portal::get_seats))
                .route("/book", web::post().to(user_portal::create_booking))
                .route("/bookings", web::get().to(user_portal::get_user_bookings))
                .route("/booking/{booking_id}", web::get().to(user_portal::get_booking_detail))
                .route("/cancel/{booking_id}", web::post().to(user_portal::cancel_booking)),
        )
        .service(
            web::scope("/driver")
                .route("/dashboard", web::get().to(driver_portal::dashboard))
                .route("/buses", web::get().to(driver_portal::assigned_buses))
                .route("/bus/{bus_id}", web::get().to(driver_portal::bus_detail)),
        )
        .service(
            web::scope("/admin")
                .route("/dashboard", web::get().to(admin_portal::dashboard))
                .route("/buses", web::get().to(admin_portal::list_buses))
                .route("/unassigned-buses", web::get().to(admin_portal::unassigned_buses))
                .route("/bus/create", web::post().to(admin_portal::create_bus))
                .route("/bus/{bus_id}/update", web::post().to(admin_portal::update_bus))
                .route("/bus/{bus_id}/assign", web::post().to(admin_portal::assign_driver))
                .route("/drivers", web::get().to(admin_portal::list_drivers))
                .route("/driver/create", web::post().to(admin_portal::create_driver)),
        );
}
