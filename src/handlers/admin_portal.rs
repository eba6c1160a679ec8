use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::{AssignDriverRequest, BusRequest, BusResponse, RegisterRequest, Role, UserResponse};
use crate::state::AppState;

pub async fn dashboard(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let dashboard = state.users.admin_dashboard(&identity.id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

pub async fn list_buses(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let buses: Vec<BusResponse> = state
        .buses
        .get_bus_with_driver_info()
        .await?
        .iter()
        .map(|(bus, driver)| {
            BusResponse::from(bus).with_driver_name(driver.as_ref().map(|d| d.name.clone()))
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "count": buses.len(),
        "buses": buses,
    })))
}

pub async fn unassigned_buses(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let buses: Vec<BusResponse> = state
        .buses
        .get_unassigned_buses()
        .await?
        .iter()
        .map(BusResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "count": buses.len(),
        "buses": buses,
    })))
}

pub async fn create_bus(
    state: web::Data<AppState>,
    identity: Identity,
    bus_req: web::Json<BusRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let bus = state.buses.create_bus(&bus_req).await?;
    info!("Admin {} created bus {} ({})", identity.id, bus.name, bus.id);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": format!("Bus '{}' created successfully.", bus.name),
        "bus": BusResponse::from(&bus),
    })))
}

pub async fn update_bus(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    bus_req: web::Json<BusRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let bus = state.buses.update_bus(&path.into_inner(), &bus_req).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Bus '{}' updated successfully.", bus.name),
        "bus": BusResponse::from(&bus),
    })))
}

pub async fn assign_driver(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    assign_req: web::Json<AssignDriverRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let driver_id = assign_req
        .driver_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Driver ID is required.".to_string()))?;

    let bus = state.buses.assign_driver(&path.into_inner(), driver_id).await?;
    let driver = state.users.get_user_by_id(driver_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Driver {} assigned to {}.", driver.name, bus.name),
        "bus": BusResponse::from(&bus).with_driver_name(Some(driver.name)),
    })))
}

pub async fn list_drivers(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let drivers = state.users.get_driver_summaries().await?;

    Ok(HttpResponse::Ok().json(json!({
        "count": drivers.len(),
        "drivers": drivers,
    })))
}

pub async fn create_driver(
    state: web::Data<AppState>,
    identity: Identity,
    driver_req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Admin)?;
    let driver = state
        .users
        .create_driver(&driver_req.name, &driver_req.email, &driver_req.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": format!("Driver account created for {}.", driver.name),
        "driver": UserResponse::from(&driver),
    })))
}
