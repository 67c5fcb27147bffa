use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::{
    api::{
        context::{ensure_role, resolve_admin_context, resolve_auth_context},
        helpers::{PageResponse, respond},
    },
    app_state::AppState,
    database::{models::customer_service, types::Role},
    errors::AppError,
    repositories::{
        PageRequest,
        customer_services::{self, BookingDetails},
    },
    services::booking::{notify_business, submit},
};

use super::functions::{assign, booking_submission, customer_service_submission, expand_page};
use super::structures::{
    AssignEmployeeDto, BookingListQuery, CreateBookingDto, CreateCustomerServiceDto,
    UpdateBookingStatusDto,
};

#[utoipa::path(
    post,
    path = "/api/booking",
    tag = "Booking",
    request_body = CreateBookingDto,
    responses(
        (status = 200, description = "Booking created", body = customer_service::Model),
        (status = 400, description = "Validation failed or a referenced row is missing; nothing is written")
    )
)]
#[post("/booking")]
pub async fn create_booking(
    data: web::Data<AppState>,
    body: web::Json<CreateBookingDto>,
) -> Result<HttpResponse, AppError> {
    let submission = booking_submission(body.into_inner())?;
    let total_price = submission.total_price.clone().unwrap_or_default();

    let (booking, details) = submit(&data.db, submission).await?;
    log::info!(
        "Booking {} saved for customer {}",
        booking.id,
        booking.customer_id
    );
    notify_business(data.mailer.clone(), &data.config, &details, &total_price);

    Ok(respond("Booking created successfully", booking))
}

#[utoipa::path(
    post,
    path = "/api/customer-service",
    tag = "Booking",
    request_body = CreateCustomerServiceDto,
    responses((status = 200, description = "Partial booking saved", body = customer_service::Model))
)]
#[post("/customer-service")]
pub async fn create_customer_service(
    data: web::Data<AppState>,
    body: web::Json<CreateCustomerServiceDto>,
) -> Result<HttpResponse, AppError> {
    let submission = customer_service_submission(body.into_inner())?;
    let (booking, _) = submit(&data.db, submission).await?;
    Ok(respond("Customer Service created successfully", booking))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Booking",
    params(BookingListQuery),
    responses((status = 200, description = "Paged bookings, newest first"))
)]
#[get("/bookings")]
pub async fn list_bookings(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<BookingListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let page = PageRequest {
        current: query.current,
        page_size: query.page_size,
    };
    let paged = customer_services::list(&data.db, query.query_string.as_deref(), page).await?;
    let expanded = expand_page(&data.db, paged).await?;
    Ok(respond("Bookings fetched successfully", PageResponse::new(expanded, &page)))
}

#[utoipa::path(
    get,
    path = "/api/booking/{id}",
    tag = "Booking",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with relations", body = BookingDetails),
        (status = 400, description = "Customer Service not found!")
    )
)]
#[get("/booking/{id}")]
pub async fn get_booking(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let booking = customer_services::find_by_id(&data.db, path.into_inner()).await?;
    let details = customer_services::load_details(&data.db, booking).await?;
    Ok(respond("Booking fetched successfully", details))
}

#[utoipa::path(
    put,
    path = "/api/booking/{id}/status",
    tag = "Booking",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusDto,
    responses((status = 200, description = "Status updated"))
)]
#[put("/booking/{id}/status")]
pub async fn update_booking_status(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateBookingStatusDto>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_auth_context(&req, &data).await?;
    ensure_role(&ctx, &[Role::Admin, Role::Employee])?;
    customer_services::set_status(&data.db, path.into_inner(), body.status_id).await?;
    Ok(respond("Booking status updated successfully", serde_json::Value::Null))
}

#[utoipa::path(
    put,
    path = "/api/booking/{id}/employee",
    tag = "Booking",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = AssignEmployeeDto,
    responses((status = 200, description = "Employee assigned"))
)]
#[put("/booking/{id}/employee")]
pub async fn update_booking_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<AssignEmployeeDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    assign(&data.db, path.into_inner(), body.employee).await?;
    Ok(respond("Booking employee updated successfully", serde_json::Value::Null))
}

#[utoipa::path(
    delete,
    path = "/api/booking/{id}",
    tag = "Booking",
    params(("id" = i32, Path, description = "Booking ID")),
    responses((status = 200, description = "Booking deleted"))
)]
#[delete("/booking/{id}")]
pub async fn delete_booking(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    customer_services::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Booking deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_booking)
        .service(create_customer_service)
        .service(list_bookings)
        .service(get_booking)
        .service(update_booking_status)
        .service(update_booking_employee)
        .service(delete_booking);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::models::{customer_add_on, customer_service, quote, schedule, vehicle},
        test_support::{Fixtures, TestHarness, read_json, seed_fixtures},
    };
    use actix_web::{App, test};
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

    fn booking_body(f: &Fixtures, make: &str) -> serde_json::Value {
        serde_json::json!({
            "totalPrice": "249.99",
            "vehicle": { "type": "SUV", "make": make, "model": "X5", "year": 2021 },
            "service": f.service.id,
            "package": f.package.id,
            "timeslot": { "date": "2025-03-03", "timeslot": f.timeslot.id },
            "customer": f.customer.id,
            "customerAddOns": { (f.add_on.id.to_string()): 2 },
        })
    }

    #[actix_web::test]
    async fn booking_materialises_each_row_once_and_replaces_the_vehicle() {
        let harness = TestHarness::new().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/booking")
            .set_json(booking_body(&f, "BMW"))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["message"], "Booking created successfully");
        assert_eq!(body["data"]["customerId"], f.customer.id);

        let db = harness.db();
        assert_eq!(vehicle::Entity::find().filter(vehicle::Column::CustomerId.eq(f.customer.id)).count(db).await.unwrap(), 1);
        assert_eq!(schedule::Entity::find().filter(schedule::Column::CustomerId.eq(f.customer.id)).count(db).await.unwrap(), 1);
        assert_eq!(quote::Entity::find().filter(quote::Column::CustomerId.eq(f.customer.id)).count(db).await.unwrap(), 1);
        assert_eq!(customer_service::Entity::find().filter(customer_service::Column::CustomerId.eq(f.customer.id)).count(db).await.unwrap(), 1);
        assert_eq!(customer_add_on::Entity::find().count(db).await.unwrap(), 1);

        let req = test::TestRequest::post()
            .uri("/booking")
            .set_json(booking_body(&f, "Audi"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let vehicles = vehicle::Entity::find()
            .filter(vehicle::Column::CustomerId.eq(f.customer.id))
            .all(db)
            .await
            .unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].make, "Audi");
        assert_eq!(customer_service::Entity::find().count(db).await.unwrap(), 1);
        assert_eq!(customer_add_on::Entity::find().count(db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn an_empty_add_on_set_clears_the_previous_add_ons() {
        let harness = TestHarness::new().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/booking")
            .set_json(booking_body(&f, "BMW"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
        assert_eq!(customer_add_on::Entity::find().count(harness.db()).await.unwrap(), 1);

        let mut body = booking_body(&f, "BMW");
        body["customerAddOns"] = serde_json::json!({});
        let req = test::TestRequest::post().uri("/booking").set_json(body).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        assert_eq!(customer_add_on::Entity::find().count(harness.db()).await.unwrap(), 0);
        assert_eq!(customer_service::Entity::find().count(harness.db()).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn booking_sends_the_business_email() {
        let harness = TestHarness::new().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/booking")
            .set_json(booking_body(&f, "BMW"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        // the mail goes out on a spawned task
        for _ in 0..50 {
            if !harness.mailer.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let sent = harness.mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "inbox@example.com");
        assert!(sent[0].1.ends_with("| Booking Created"));
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected_before_any_write() {
        let harness = TestHarness::new().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(
            App::new()
                .app_data(harness.data())
                .app_data(web::JsonConfig::default().error_handler(crate::api::helpers::json_error_handler))
                .configure(init_routes),
        )
        .await;

        let mut body = booking_body(&f, "BMW");
        body.as_object_mut().unwrap().remove("vehicle");
        let req = test::TestRequest::post().uri("/booking").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(customer_service::Entity::find().count(harness.db()).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn admin_lists_expanded_bookings_and_assigns_an_employee() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/customer-service")
            .set_json(serde_json::json!({
                "customer": f.customer.id,
                "service": f.service.id,
                "package": f.package.id,
            }))
            .to_request();
        let created = read_json(test::call_service(&app, req).await).await;
        let id = created["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/booking/{}/employee", id))
            .insert_header(("Authorization", token.clone()))
            .set_json(serde_json::json!({ "employee": f.employee.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/bookings?current=1&pageSize=10")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["res"][0]["package"]["name"], "gold");
        assert_eq!(body["data"]["res"][0]["employee"]["id"], f.employee.id);

        let req = test::TestRequest::delete()
            .uri(&format!("/booking/{}", id))
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri(&format!("/booking/{}", id))
            .insert_header(("Authorization", token))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["message"], "Customer Service not found!");
    }
}
