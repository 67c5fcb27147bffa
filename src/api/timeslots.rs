use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    api::{context::resolve_admin_context, helpers::respond, validation::require},
    app_state::AppState,
    database::models::timeslot,
    errors::AppError,
    repositories::timeslots,
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotDto {
    pub id: Option<i32>,
    /// e.g. "09:00 AM"
    pub time: String,
    /// Comma separated weekdays, 0 = Sunday.
    pub days: String,
}

fn validate_days(days: &str) -> Result<(), AppError> {
    let valid = days
        .split(',')
        .map(str::trim)
        .all(|d| d.parse::<u32>().is_ok_and(|n| n <= 6));
    if !valid {
        return Err(AppError::invalid("days must be comma separated numbers from 0 to 6"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/timeslot",
    tag = "Timeslots",
    request_body = TimeslotDto,
    responses(
        (status = 200, description = "Timeslot created", body = timeslot::Model),
        (status = 400, description = "Timeslot already exists!")
    )
)]
#[post("/timeslot")]
pub async fn create_timeslot(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<TimeslotDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let time = require(&body.time, "time")?;
    validate_days(&body.days)?;
    let created = timeslots::create(&data.db, &time, &body.days).await?;
    Ok(respond("Timeslot created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/timeslot",
    tag = "Timeslots",
    request_body = TimeslotDto,
    responses((status = 200, description = "Timeslot updated", body = timeslot::Model))
)]
#[put("/timeslot")]
pub async fn update_timeslot(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<TimeslotDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let time = require(&body.time, "time")?;
    validate_days(&body.days)?;
    let updated = timeslots::update(&data.db, body.id, &time, &body.days).await?;
    Ok(respond("Timeslot updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/timeslots",
    tag = "Timeslots",
    responses((status = 200, description = "All timeslots", body = [timeslot::Model]))
)]
#[get("/timeslots")]
pub async fn list_timeslots(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let rows = timeslots::list(&data.db).await?;
    Ok(respond("Timeslots retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/timeslots/date/{date}",
    tag = "Timeslots",
    params(("date" = String, Path, description = "Date as YYYY-MM-DD")),
    responses((status = 200, description = "Timeslots offered on that weekday", body = [timeslot::Model]))
)]
#[get("/timeslots/date/{date}")]
pub async fn list_for_date(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let date = NaiveDate::parse_from_str(&path, "%Y-%m-%d")
        .map_err(|_| AppError::invalid("Invalid date"))?;
    let rows = timeslots::list_for_date(&data.db, date).await?;
    Ok(respond("Timeslots retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/timeslot/{id}",
    tag = "Timeslots",
    params(("id" = i32, Path, description = "Timeslot ID")),
    responses((status = 200, description = "Timeslot found", body = timeslot::Model))
)]
#[get("/timeslot/{id}")]
pub async fn get_timeslot(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let found = timeslots::find_by_id(&data.db, path.into_inner()).await?;
    Ok(respond("Timeslot retrieved successfully", found))
}

#[utoipa::path(
    delete,
    path = "/api/timeslot/{id}",
    tag = "Timeslots",
    params(("id" = i32, Path, description = "Timeslot ID")),
    responses((status = 200, description = "Timeslot deleted"))
)]
#[delete("/timeslot/{id}")]
pub async fn delete_timeslot(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    timeslots::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Timeslot deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_timeslot)
        .service(update_timeslot)
        .service(list_timeslots)
        .service(list_for_date)
        .service(get_timeslot)
        .service(delete_timeslot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn days_must_be_weekday_numbers() {
        assert!(validate_days("0,1, 6").is_ok());
        assert!(validate_days("7").is_err());
        assert!(validate_days("mon").is_err());
    }

    #[actix_web::test]
    async fn duplicate_timeslot_and_missing_update_id_are_rejected() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let create = || {
            test::TestRequest::post()
                .uri("/timeslot")
                .insert_header(("Authorization", token.clone()))
                .set_json(serde_json::json!({ "time": "10:00 AM", "days": "1,3,5" }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, create()).await.status(), 200);
        let resp = test::call_service(&app, create()).await;
        assert_eq!(read_json(resp).await["message"], "Timeslot already exists!");

        let req = test::TestRequest::put()
            .uri("/timeslot")
            .insert_header(("Authorization", token))
            .set_json(serde_json::json!({ "time": "11:00 AM", "days": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(read_json(resp).await["message"], "Timeslot ID is required!");
    }

    #[actix_web::test]
    async fn date_lookup_uses_the_weekday() {
        let harness = TestHarness::new().await;
        timeslots::create(harness.db(), "08:00 AM", "1,3").await.unwrap();
        timeslots::create(harness.db(), "01:00 PM", "0,6").await.unwrap();
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        // 2025-03-03 is a Monday
        let req = test::TestRequest::get().uri("/timeslots/date/2025-03-03").to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["time"], "08:00 AM");
    }
}
