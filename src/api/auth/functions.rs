use chrono::{DateTime, Utc};
use url::Url;

use crate::{
    app_state::AppState,
    database::types::Role,
    errors::AppError,
    repositories::{admins, customers, employees},
    services::{
        auth::{
            decode_token, hash_password, issue_reset_token, issue_token, reset_pending,
            verify_password,
        },
        notifications,
    },
};

use super::structures::{LoginRequest, LoginResponse, ResetPasswordRequest};

/// Role-independent view of an account for login and password reset.
struct Credentials {
    id: i32,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    password_hash: Option<String>,
    pass_reset_at: Option<DateTime<Utc>>,
}

async fn active_credentials(
    state: &AppState,
    role: Role,
    email: &str,
) -> Result<Option<Credentials>, AppError> {
    let db = &state.db;
    let found = match role {
        Role::Customer => customers::find_active_by_email(db, email).await?.map(|c| Credentials {
            id: c.id,
            email: c.email.unwrap_or_default(),
            first_name: c.first_name,
            last_name: c.last_name,
            password_hash: c.password,
            pass_reset_at: c.pass_reset_at,
        }),
        Role::Admin => admins::find_active_by_email(db, email).await?.map(|a| Credentials {
            id: a.id,
            email: a.email,
            first_name: Some(a.first_name),
            last_name: Some(a.last_name),
            password_hash: Some(a.password),
            pass_reset_at: a.pass_reset_at,
        }),
        Role::Employee => employees::find_active_by_email(db, email).await?.map(|e| Credentials {
            id: e.id,
            email: e.email,
            first_name: Some(e.first_name),
            last_name: Some(e.last_name),
            password_hash: Some(e.password),
            pass_reset_at: e.pass_reset_at,
        }),
    };
    Ok(found)
}

pub async fn login(
    state: &AppState,
    role: Role,
    req: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let creds = active_credentials(state, role, &req.email)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found!"))?;

    let matches = creds
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !matches {
        return Err(AppError::invalid("Incorrect Email or password"));
    }

    let access_token = issue_token(
        &state.config.jwt_secret,
        creds.id,
        &creds.email,
        role,
        req.remember,
    )?;
    log::info!("{} {} logged in", role, creds.id);

    Ok(LoginResponse {
        id: creds.id,
        first_name: creds.first_name,
        last_name: creds.last_name,
        email: creds.email,
        role,
        access_token,
    })
}

pub fn reset_link(frontend_url: &str, token: &str) -> Result<String, AppError> {
    let base = format!("{}/", frontend_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .and_then(|base| base.join("reset-password"))
        .map_err(|err| AppError::invalid(format!("Invalid FRONTEND_URL: {}", err)))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}

async fn stamp_reset(
    state: &AppState,
    role: Role,
    id: i32,
    at: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    let db = &state.db;
    match role {
        Role::Customer => {
            let account = customers::find_by_id(db, id).await?;
            customers::set_pass_reset_at(db, account, at).await?;
        }
        Role::Admin => {
            let account = admins::find_by_id(db, id).await?;
            admins::set_pass_reset_at(db, account, at).await?;
        }
        Role::Employee => {
            let account = employees::find_by_id(db, id).await?;
            employees::set_pass_reset_at(db, account, at).await?;
        }
    }
    Ok(())
}

/// Issues a reset link. Unknown emails succeed silently so accounts cannot be probed.
pub async fn request_password_reset(
    state: &AppState,
    role: Role,
    email: &str,
) -> Result<(), AppError> {
    let Some(creds) = active_credentials(state, role, email).await? else {
        log::info!("Password reset requested for unknown {} {}", role, email);
        return Ok(());
    };

    let now = Utc::now();
    if reset_pending(creds.pass_reset_at, now) {
        return Err(AppError::invalid("Reset link already sent, try again later"));
    }

    let token = issue_reset_token(&state.config.jwt_secret, creds.id, &creds.email, role)?;
    let link = reset_link(state.config.frontend_url(), &token)?;
    stamp_reset(state, role, creds.id, Some(now)).await?;

    let email = notifications::password_reset(
        &state.config.company_name,
        creds.first_name.as_deref().unwrap_or_default(),
        &link,
    );
    let mailer = state.mailer.clone();
    let to = creds.email.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_html(&to, &email.subject, email.html).await {
            log::error!("Problem sending reset email to {}: {}", to, err);
        }
    });
    Ok(())
}

pub async fn reset_password(state: &AppState, req: &ResetPasswordRequest) -> Result<(), AppError> {
    let claims = decode_token(&state.config.jwt_secret, &req.token).map_err(|_| {
        AppError::invalid("Token Expired, Please Request for reset password again")
    })?;
    let db = &state.db;
    let hash = hash_password(&req.password, state.config.hash_salt_rounds)?;
    let already_processed =
        || AppError::invalid("Request Already Processed. Contact Support for Further Details");

    match claims.role {
        Role::Customer => {
            let account = customers::find_by_id(db, claims.id).await?;
            if account.pass_reset_at.is_none() {
                return Err(already_processed());
            }
            customers::set_password(db, account, hash).await?;
        }
        Role::Admin => {
            let account = admins::find_by_id(db, claims.id).await?;
            if account.pass_reset_at.is_none() {
                return Err(already_processed());
            }
            admins::set_password(db, account, hash).await?;
        }
        Role::Employee => {
            let account = employees::find_by_id(db, claims.id).await?;
            if account.pass_reset_at.is_none() {
                return Err(already_processed());
            }
            employees::set_password(db, account, hash).await?;
        }
    }
    Ok(())
}
