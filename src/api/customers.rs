use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        context::{AuthContext, resolve_admin_context, resolve_auth_context},
        helpers::{PageResponse, respond},
        validation::{validate_email, validate_password, validate_phone},
    },
    app_state::AppState,
    database::{models::customer, types::Role},
    errors::AppError,
    repositories::{
        PageRequest,
        customers::{self, CustomerFilter, CustomerPatch, NewCustomer},
    },
    services::auth::{hash_password, random_password, verify_password},
};

// --- DTOs ---

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    /// A random password is generated when omitted.
    pub password: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIntentDto {
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub status_id: Option<i32>,
    pub new_email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    pub status_id: Option<i32>,
    pub query_string: Option<String>,
    pub current: Option<u64>,
    pub page_size: Option<u64>,
}

/// Admins may touch any customer; a customer only themself.
fn ensure_owner_or_admin(ctx: &AuthContext, customer_id: i32) -> Result<(), AppError> {
    match ctx.role() {
        Role::Admin => Ok(()),
        Role::Customer if ctx.account.id() == customer_id => Ok(()),
        _ => Err(AppError::Unauthorized("Not authorized!".to_string())),
    }
}

// --- Route Handlers ---

#[utoipa::path(
    post,
    path = "/api/customer",
    tag = "Customers",
    request_body = CreateCustomerDto,
    responses((status = 200, description = "Customer created, or the existing one for this email", body = customer::Model))
)]
#[post("/customer")]
pub async fn create_customer(
    data: web::Data<AppState>,
    body: web::Json<CreateCustomerDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    let email = validate_email(&dto.email)?;
    let password = match dto.password {
        Some(password) => {
            validate_password(&password)?;
            password
        }
        None => random_password(),
    };

    let (customer, created) = customers::create_or_get(
        &data.db,
        NewCustomer {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: Some(email),
            phone: dto.phone,
            password: Some(hash_password(&password, data.config.hash_salt_rounds)?),
            address: dto.address,
            city: dto.city,
            state: dto.state,
            zip_code: dto.zip_code,
        },
    )
    .await?;

    let message = if created {
        "Customer created successfully"
    } else {
        "Customer already exists"
    };
    Ok(respond(message, customer))
}

#[utoipa::path(
    post,
    path = "/api/customer/intent",
    tag = "Customers",
    request_body = CustomerIntentDto,
    responses((status = 200, description = "Lead captured", body = customer::Model))
)]
#[post("/customer/intent")]
pub async fn create_intent(
    data: web::Data<AppState>,
    body: web::Json<CustomerIntentDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    let phone = validate_phone(&dto.phone)?;
    let email = dto.email.as_deref().map(validate_email).transpose()?;

    let customer = customers::upsert_by_phone(
        &data.db,
        &phone,
        CustomerPatch {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email,
            address: dto.address,
            city: dto.city,
            state: dto.state,
            zip_code: dto.zip_code,
            ..Default::default()
        },
    )
    .await?;
    Ok(respond("Customer intent saved", customer))
}

#[utoipa::path(
    get,
    path = "/api/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer found", body = customer::Model),
        (status = 400, description = "Customer not found!")
    )
)]
#[get("/customer/{id}")]
pub async fn get_customer(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let ctx = resolve_auth_context(&req, &data).await?;
    ensure_owner_or_admin(&ctx, id)?;
    let customer = customers::find_by_id(&data.db, id).await?;
    Ok(respond("Success", customer))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(CustomerListQuery),
    responses((status = 200, description = "Paged customers"))
)]
#[get("/customers")]
pub async fn list_customers(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<CustomerListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let query = query.into_inner();
    let page = PageRequest {
        current: query.current,
        page_size: query.page_size,
    };
    let filter = CustomerFilter {
        status_id: query.status_id,
        query: query.query_string,
    };
    let paged = customers::list(&data.db, &filter, page).await?;
    Ok(respond("Success", PageResponse::new(paged, &page)))
}

#[utoipa::path(
    put,
    path = "/api/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerDto,
    responses((status = 200, description = "Customer updated", body = customer::Model))
)]
#[put("/customer/{id}")]
pub async fn update_customer(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateCustomerDto>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let ctx = resolve_auth_context(&req, &data).await?;
    ensure_owner_or_admin(&ctx, id)?;
    let dto = body.into_inner();
    let existing = customers::find_by_id(&data.db, id).await?;

    let email = match dto.new_email.as_deref() {
        Some(new_email) => {
            let new_email = validate_email(new_email)?;
            if let Some(other) = customers::find_by_email(&data.db, &new_email).await? {
                if other.id != existing.id {
                    return Err(AppError::Conflict("Email already exist".to_string()));
                }
            }
            Some(new_email)
        }
        None => None,
    };

    let password = match dto.new_password.as_deref() {
        Some(new_password) => {
            validate_password(new_password)?;
            // admins reset without knowing the old password
            if ctx.role() != Role::Admin {
                let current = dto.current_password.as_deref().unwrap_or_default();
                let matches = existing
                    .password
                    .as_deref()
                    .is_some_and(|hash| verify_password(current, hash));
                if !matches {
                    return Err(AppError::invalid("Incorrect current password"));
                }
            }
            Some(hash_password(new_password, data.config.hash_salt_rounds)?)
        }
        None => None,
    };

    let status_id = if ctx.role() == Role::Admin {
        dto.status_id
    } else {
        None
    };

    let updated = customers::update(
        &data.db,
        existing,
        CustomerPatch {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email,
            phone: dto.phone,
            password,
            address: dto.address,
            city: dto.city,
            state: dto.state,
            zip_code: dto.zip_code,
            status_id,
        },
    )
    .await?;
    Ok(respond("Customer updated successfully", updated))
}

#[utoipa::path(
    delete,
    path = "/api/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "Customer deleted"))
)]
#[delete("/customer/{id}")]
pub async fn delete_customer(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    customers::soft_delete(&data.db, path.into_inner()).await?;
    Ok(respond("Customer deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_customer)
        .service(create_intent)
        .service(list_customers)
        .service(get_customer)
        .service(update_customer)
        .service(delete_customer);
}
