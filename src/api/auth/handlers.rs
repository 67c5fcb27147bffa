use actix_web::{HttpRequest, HttpResponse, get, post, web};

use crate::{
    api::{
        context::{Account, resolve_admin_context, resolve_auth_context},
        helpers::respond,
        validation::{require, validate_email, validate_password},
    },
    app_state::AppState,
    database::types::Role,
    errors::AppError,
    repositories::{admins, customers},
    services::auth::{hash_password, issue_token},
};

use super::functions::{login, request_password_reset, reset_password};
use super::structures::{
    AdminSignupRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest,
    SignupRequest,
};

async fn login_as(
    state: &web::Data<AppState>,
    role: Role,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let mut req = body.into_inner();
    req.email = validate_email(&req.email)?;
    let res = login(state, role, &req).await?;
    Ok(respond("Logged in successfully", res))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Customer logged in", body = LoginResponse),
        (status = 400, description = "Account not found or wrong password")
    )
)]
#[post("/auth/login")]
pub async fn login_customer(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_as(&data, Role::Customer, body).await
}

#[utoipa::path(
    post,
    path = "/api/auth/login-admin",
    tag = "Auth",
    request_body = LoginRequest,
    responses((status = 200, description = "Admin logged in", body = LoginResponse))
)]
#[post("/auth/login-admin")]
pub async fn login_admin(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_as(&data, Role::Admin, body).await
}

#[utoipa::path(
    post,
    path = "/api/auth/login-employee",
    tag = "Auth",
    request_body = LoginRequest,
    responses((status = 200, description = "Employee logged in", body = LoginResponse))
)]
#[post("/auth/login-employee")]
pub async fn login_employee(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_as(&data, Role::Employee, body).await
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses((status = 200, description = "Customer account created or already present"))
)]
#[post("/auth/signup")]
pub async fn signup(
    data: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let (customer, created) = customers::create_or_get(
        &data.db,
        customers::NewCustomer {
            first_name: Some(require(&req.first_name, "firstName")?),
            last_name: Some(require(&req.last_name, "lastName")?),
            email: Some(email.clone()),
            phone: req.phone,
            password: Some(hash_password(&req.password, data.config.hash_salt_rounds)?),
            address: req.address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
        },
    )
    .await?;

    if !created {
        return Ok(respond("Account already exists", serde_json::json!({ "user": customer })));
    }

    let token = issue_token(&data.config.jwt_secret, customer.id, &email, Role::Customer, false)?;
    Ok(respond(
        "Signed up successfully",
        serde_json::json!({ "user": customer, "accessToken": token }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup-admin",
    tag = "Auth",
    request_body = AdminSignupRequest,
    responses(
        (status = 200, description = "Admin created"),
        (status = 401, description = "Not authorized")
    )
)]
#[post("/auth/signup-admin")]
pub async fn signup_admin(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AdminSignupRequest>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let body = body.into_inner();
    let email = validate_email(&body.email)?;
    validate_password(&body.password)?;

    let admin = admins::create(
        &data.db,
        require(&body.first_name, "firstName")?,
        require(&body.last_name, "lastName")?,
        &email,
        hash_password(&body.password, data.config.hash_salt_rounds)?,
    )
    .await?;
    Ok(respond("Admin created successfully", admin))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 400, description = "A link was sent less than five minutes ago")
    )
)]
#[post("/auth/forgot-password")]
pub async fn forgot_password(
    data: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = validate_email(&body.email)?;
    let role = body.role.unwrap_or(Role::Customer);
    request_password_reset(&data, role, &email).await?;
    Ok(respond("Reset link sent", serde_json::Value::Null))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Password updated"))
)]
#[post("/auth/reset-password")]
pub async fn reset_password_handler(
    data: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    validate_password(&body.password)?;
    reset_password(&data, &body).await?;
    Ok(respond("Password Successfully Updated", serde_json::Value::Null))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current account", body = Account),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[get("/auth/me")]
pub async fn me(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = resolve_auth_context(&req, &data).await?;
    Ok(respond("Success", ctx.account))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login_customer)
        .service(login_admin)
        .service(login_employee)
        .service(signup)
        .service(signup_admin)
        .service(forgot_password)
        .service(reset_password_handler)
        .service(me);
}
