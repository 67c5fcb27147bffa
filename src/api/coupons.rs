use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        context::resolve_admin_context,
        helpers::{PageResponse, respond},
        validation::require,
    },
    app_state::AppState,
    database::models::coupon,
    errors::AppError,
    repositories::{
        PageRequest,
        coupons::{self, CouponInput},
    },
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CouponDto {
    pub id: Option<i32>,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[schema(value_type = String, format = DateTime)]
    pub start_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub end_at: DateTime<Utc>,
}

impl CouponDto {
    fn into_input(self) -> Result<CouponInput, AppError> {
        if self.end_at < self.start_at {
            return Err(AppError::invalid("endAt must be after startAt"));
        }
        if self.discount_amount < 0.0 || !(0.0..=100.0).contains(&self.discount_percentage) {
            return Err(AppError::invalid("Invalid discount"));
        }
        Ok(CouponInput {
            code: require(&self.code, "code")?,
            description: self.description,
            discount_amount: self.discount_amount,
            discount_percentage: self.discount_percentage,
            start_at: self.start_at,
            end_at: self.end_at,
        })
    }
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CouponListQuery {
    /// Partial match on the coupon code.
    pub query_string: Option<String>,
    pub current: Option<u64>,
    pub page_size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/coupon",
    tag = "Coupons",
    request_body = CouponDto,
    responses(
        (status = 200, description = "Coupon created", body = coupon::Model),
        (status = 400, description = "Coupon already exists!")
    )
)]
#[post("/coupon")]
pub async fn create_coupon(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CouponDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let created = coupons::create(&data.db, body.into_inner().into_input()?).await?;
    Ok(respond("Coupon created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/coupon",
    tag = "Coupons",
    request_body = CouponDto,
    responses((status = 200, description = "Coupon updated", body = coupon::Model))
)]
#[put("/coupon")]
pub async fn update_coupon(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CouponDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let id = dto.id;
    let updated = coupons::update(&data.db, id, dto.into_input()?).await?;
    Ok(respond("Coupon updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "Coupons",
    params(CouponListQuery),
    responses((status = 200, description = "Paged coupons"))
)]
#[get("/coupons")]
pub async fn list_coupons(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<CouponListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let page = PageRequest {
        current: query.current,
        page_size: query.page_size,
    };
    let paged = coupons::list(&data.db, query.query_string.as_deref(), page).await?;
    Ok(respond("Coupons retrieved successfully", PageResponse::new(paged, &page)))
}

#[utoipa::path(
    get,
    path = "/api/coupon/{id}",
    tag = "Coupons",
    params(("id" = i32, Path, description = "Coupon ID")),
    responses((status = 200, description = "Coupon found", body = coupon::Model))
)]
#[get("/coupon/{id}")]
pub async fn get_coupon(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let found = coupons::find_by_id(&data.db, path.into_inner()).await?;
    Ok(respond("Coupon retrieved successfully", found))
}

#[utoipa::path(
    get,
    path = "/api/coupon/code/{code}",
    tag = "Coupons",
    params(("code" = String, Path, description = "Coupon code")),
    responses(
        (status = 200, description = "Coupon is redeemable now", body = coupon::Model),
        (status = 400, description = "Not found, expired, or not active yet")
    )
)]
#[get("/coupon/code/{code}")]
pub async fn get_coupon_by_code(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let found = coupons::find_redeemable_by_code(&data.db, &path).await?;
    Ok(respond("Coupon retrieved successfully", found))
}

#[utoipa::path(
    delete,
    path = "/api/coupon/{id}",
    tag = "Coupons",
    params(("id" = i32, Path, description = "Coupon ID")),
    responses((status = 200, description = "Coupon deleted"))
)]
#[delete("/coupon/{id}")]
pub async fn delete_coupon(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    coupons::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Coupon deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_coupon)
        .service(update_coupon)
        .service(list_coupons)
        .service(get_coupon_by_code)
        .service(get_coupon)
        .service(delete_coupon);
}
