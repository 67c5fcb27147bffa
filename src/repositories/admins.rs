use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};

use crate::{
    database::{models::admin, types::Status},
    errors::AppError,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<admin::Model, AppError> {
    admin::Entity::find_by_id(id)
        .filter(admin::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Admin not found!"))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<admin::Model>, AppError> {
    Ok(admin::Entity::find()
        .filter(admin::Column::Email.eq(email.trim().to_lowercase()))
        .filter(admin::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

pub async fn find_active_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<admin::Model>, AppError> {
    Ok(admin::Entity::find()
        .filter(admin::Column::Email.eq(email.trim().to_lowercase()))
        .filter(admin::Column::StatusId.eq(Status::Active.id()))
        .filter(admin::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

/// `password` is a bcrypt hash.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    first_name: String,
    last_name: String,
    email: &str,
    password: String,
) -> Result<admin::Model, AppError> {
    if find_by_email(db, email).await?.is_some() {
        return Err(AppError::Conflict("Admin already exists".to_string()));
    }

    let created = admin::ActiveModel {
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email.trim().to_lowercase()),
        password: Set(password),
        status_id: Set(Status::Active.id()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    existing: admin::Model,
    password_hash: String,
) -> Result<admin::Model, AppError> {
    let mut active = existing.into_active_model();
    active.password = Set(password_hash);
    active.pass_reset_at = Set(None);
    Ok(active.update(db).await?)
}

pub async fn set_pass_reset_at<C: ConnectionTrait>(
    db: &C,
    existing: admin::Model,
    at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<admin::Model, AppError> {
    let mut active = existing.into_active_model();
    active.pass_reset_at = Set(at);
    Ok(active.update(db).await?)
}
