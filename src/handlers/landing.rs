use actix_web::HttpResponse;
use serde_json::json;

use crate::config::ALL_BUS_STOPS;
use crate::models::Role;

/// Entry point listing the three portals and their login routes.
pub async fn index() -> HttpResponse {
    let portals: Vec<_> = [Role::User, Role::Driver, Role::Admin]
        .iter()
        .map(|role| {
            json!({
                "portal": role.portal(),
                "audience": role.audience(),
                "login": format!("/auth/login/{}", role.portal()),
                "dashboard": role.dashboard_path(),
            })
        })
        .collect();

    HttpResponse::Ok().json(json!({
        "name": "BusFlow",
        "portals": portals,
        "register": "/auth/register",
        "bus_stops": ALL_BUS_STOPS,
    }))
}
