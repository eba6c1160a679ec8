use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::{BusResponse, Role};
use crate::state::AppState;

pub async fn dashboard(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Driver)?;
    let dashboard = state.users.driver_dashboard(&identity.id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

pub async fn assigned_buses(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Driver)?;
    let buses: Vec<BusResponse> = state
        .buses
        .get_buses_for_driver(&identity.id)
        .await?
        .iter()
        .map(BusResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "count": buses.len(),
        "buses": buses,
    })))
}

pub async fn bus_detail(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Driver)?;
    let bus = state.buses.get_bus_by_id(&path.into_inner()).await?;
    if bus.driver_id.as_deref() != Some(identity.id.as_str()) {
        return Err(AppError::Forbidden(
            "This bus is not assigned to you.".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "bus": BusResponse::from(&bus).with_driver_name(Some(identity.name)),
    })))
}
