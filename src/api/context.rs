use actix_web::{HttpRequest, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    app_state::AppState,
    database::{
        models::{admin, customer, employee},
        types::Role,
    },
    errors::AppError,
    repositories::{admins, customers, employees},
    services::auth::{Claims, decode_token},
};

/// The account behind a token.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Account {
    Customer(customer::Model),
    Admin(admin::Model),
    Employee(employee::Model),
}

impl Account {
    pub fn id(&self) -> i32 {
        match self {
            Account::Customer(c) => c.id,
            Account::Admin(a) => a.id,
            Account::Employee(e) => e.id,
        }
    }

    fn is_deleted(&self) -> bool {
        match self {
            Account::Customer(c) => c.deleted_at.is_some(),
            Account::Admin(a) => a.deleted_at.is_some(),
            Account::Employee(e) => e.deleted_at.is_some(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthContext {
    pub claims: Claims,
    pub account: Account,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn is_admin(&self) -> bool {
        self.claims.role == Role::Admin
    }
}

fn not_authorized() -> AppError {
    AppError::Unauthorized("Not authorized!".to_string())
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Auth Missing".to_string()))?;
    Ok(raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string())
}

pub async fn resolve_auth_context(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<AuthContext, AppError> {
    let token = bearer_token(req)?;
    let claims = decode_token(&app_state.config.jwt_secret, &token)?;
    let db = &app_state.db;

    let account = match claims.role {
        Role::Customer => customers::find_by_id(db, claims.id).await.map(Account::Customer),
        Role::Admin => admins::find_by_id(db, claims.id).await.map(Account::Admin),
        Role::Employee => employees::find_by_id(db, claims.id).await.map(Account::Employee),
    }
    .map_err(|err| match err {
        AppError::DbError(_) => err,
        _ => not_authorized(),
    })?;

    if account.is_deleted() {
        return Err(not_authorized());
    }

    Ok(AuthContext { claims, account })
}

pub fn ensure_admin_access(ctx: &AuthContext) -> Result<(), AppError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(not_authorized())
    }
}

pub fn ensure_role(ctx: &AuthContext, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&ctx.role()) {
        Ok(())
    } else {
        Err(not_authorized())
    }
}

pub async fn resolve_admin_context(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<AuthContext, AppError> {
    let ctx = resolve_auth_context(req, app_state).await?;
    ensure_admin_access(&ctx)?;
    Ok(ctx)
}
