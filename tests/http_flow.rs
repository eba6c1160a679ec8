use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use busflow::auth::TokenKeys;
use busflow::db::MemoryStore;
use busflow::handlers;
use busflow::models::Role;
use busflow::service::Service;
use busflow::state::AppState;

fn memory_state() -> web::Data<AppState> {
    let service = Service::new(
        Arc::new(MemoryStore::new()),
        TokenKeys::new("http-test-secret", 1),
        4,
    );
    web::Data::new(AppState::new(service))
}

async fn seed_admin(state: &web::Data<AppState>) {
    state
        .service
        .register("Ada Admin", "admin@example.com", "adminpass", Role::Admin)
        .await
        .unwrap();
}

async fn body(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(handlers::configure),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $portal:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri(&format!("/auth/login/{}", $portal))
            .set_json(json!({ "email": $email, "password": $password }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body(resp).await["token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn passenger_books_and_cancels_seats() {
    let state = memory_state();
    seed_admin(&state).await;
    let app = app!(state);

    let admin = login!(app, "admin", "admin@example.com", "adminpass");
    let req = test::TestRequest::post()
        .uri("/admin/bus/create")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "name": "Red Express",
            "route": ["Uttara", "Banani", "Farmgate"],
            "price": 60,
            "total_seats": 40
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bus_id = body(resp).await["bus"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": "Alice Rahman",
            "email": "Alice@Example.com",
            "password": "secret1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login/user")
        .set_json(json!({ "email": "alice@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login = body(resp).await;
    assert_eq!(login["redirect"], "/user/dashboard");
    assert_eq!(login["message"], "Welcome back, Alice!");
    let alice = login["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/user/search")
        .insert_header(bearer(&alice))
        .set_json(json!({ "source": "Banani", "destination": "Farmgate" }))
        .to_request();
    let found = body(test::call_service(&app, req).await).await;
    assert_eq!(found["count"], 1);

    let req = test::TestRequest::post()
        .uri("/user/search")
        .insert_header(bearer(&alice))
        .set_json(json!({ "source": "Farmgate", "destination": "Uttara" }))
        .to_request();
    let found = body(test::call_service(&app, req).await).await;
    assert_eq!(found["count"], 0);

    let req = test::TestRequest::post()
        .uri("/user/book")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "bus_id": bus_id,
            "seats": ["A1", "A2"],
            "source": "Uttara",
            "destination": "Farmgate"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booked = body(resp).await;
    assert_eq!(booked["message"], "Successfully booked 2 seat(s).");
    assert_eq!(booked["total_price"], 120);
    assert!(booked.get("partial_errors").is_none());
    let first_booking = booked["bookings"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/user/book")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "bus_id": bus_id,
            "seats": ["A1"],
            "source": "Uttara",
            "destination": "Farmgate"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body(resp).await["error"]
        .as_str()
        .unwrap()
        .contains("already booked"));

    let cancel_uri = format!("/user/cancel/{}", first_booking);
    let req = test::TestRequest::post()
        .uri(&cancel_uri)
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["booking"]["status"], "CANCELLED");

    let req = test::TestRequest::post()
        .uri(&cancel_uri)
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/user/bookings")
        .insert_header(bearer(&alice))
        .to_request();
    let listing = body(test::call_service(&app, req).await).await;
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["active_count"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/user/seats/{}", bus_id))
        .insert_header(bearer(&alice))
        .to_request();
    let seats = body(test::call_service(&app, req).await).await;
    assert_eq!(seats["available"], 39);
    let seat = |number: &str| {
        seats["seats"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["seat_number"] == number)
            .cloned()
            .unwrap()
    };
    assert_eq!(seat("A1")["is_available"], true);
    assert_eq!(seat("A2")["is_available"], false);

    let req = test::TestRequest::get()
        .uri("/user/dashboard")
        .insert_header(bearer(&alice))
        .to_request();
    let dashboard = body(test::call_service(&app, req).await).await;
    assert_eq!(dashboard["active_bookings"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["cancelled_bookings"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn portals_enforce_roles() {
    let state = memory_state();
    seed_admin(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "name": "Bob", "email": "bob@example.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login/driver")
        .set_json(json!({ "email": "bob@example.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login/captain")
        .set_json(json!({ "email": "bob@example.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/auth/login/user")
        .set_json(json!({ "email": "bob@example.com", "password": "wrong-password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/user/dashboard").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/user/dashboard")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let bob = login!(app, "user", "bob@example.com", "secret1");
    let req = test::TestRequest::get()
        .uri("/user/seats/whatever?date=not-a-date")
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body(resp).await["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body(resp).await["error"],
        "Access denied. This portal is for administrators only."
    );

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "name": "Bobby", "email": "BOB@example.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn admin_assigns_driver_who_then_sees_the_bus() {
    let state = memory_state();
    seed_admin(&state).await;
    let passenger = state
        .service
        .register("Pat Passenger", "pat@example.com", "secret1", Role::User)
        .await
        .unwrap();
    let app = app!(state);
    let admin = login!(app, "admin", "admin@example.com", "adminpass");

    let req = test::TestRequest::post()
        .uri("/admin/bus/create")
        .insert_header(bearer(&admin))
        .set_json(json!({ "name": "Green Line", "route": ["Gabtoli", "Mirpur 1"], "price": 40 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bus = body(resp).await;
    assert_eq!(bus["bus"]["total_seats"], 40);
    let bus_id = bus["bus"]["id"].as_str().unwrap().to_string();
    let assign_uri = format!("/admin/bus/{}/assign", bus_id);

    let req = test::TestRequest::post()
        .uri(&assign_uri)
        .insert_header(bearer(&admin))
        .set_json(json!({ "driver_id": passenger.id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&assign_uri)
        .insert_header(bearer(&admin))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(resp).await["error"], "Driver ID is required.");

    let req = test::TestRequest::post()
        .uri("/admin/driver/create")
        .insert_header(bearer(&admin))
        .set_json(json!({ "name": "Dina Driver", "email": "dina@example.com", "password": "drive1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let driver_id = body(resp).await["driver"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&assign_uri)
        .insert_header(bearer(&admin))
        .set_json(json!({ "driver_id": driver_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["bus"]["driver_name"], "Dina Driver");

    let req = test::TestRequest::get()
        .uri("/admin/unassigned-buses")
        .insert_header(bearer(&admin))
        .to_request();
    assert_eq!(body(test::call_service(&app, req).await).await["count"], 0);

    let driver = login!(app, "driver", "dina@example.com", "drive1");
    let req = test::TestRequest::get()
        .uri("/driver/buses")
        .insert_header(bearer(&driver))
        .to_request();
    let buses = body(test::call_service(&app, req).await).await;
    assert_eq!(buses["count"], 1);
    assert_eq!(buses["buses"][0]["id"], bus_id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/driver/bus/{}", bus_id))
        .insert_header(bearer(&driver))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(bearer(&admin))
        .to_request();
    let dashboard = body(test::call_service(&app, req).await).await;
    assert_eq!(dashboard["statistics"]["drivers"], 1);
    assert_eq!(dashboard["drivers"][0]["assigned_bus"], "Green Line");
}
