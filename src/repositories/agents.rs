use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TryIntoModel,
};

use crate::{
    database::{
        models::{agent, coupon},
        types::Status,
    },
    errors::AppError,
};

#[derive(Debug, Clone)]
pub struct AgentInput {
    pub name: String,
    pub r#type: String,
    pub prompt: String,
    pub status_id: Option<i32>,
    pub email_subject_format: Option<String>,
    pub coupon_id: Option<i32>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<agent::Model, AppError> {
    agent::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Agent not found!"))
}

/// Agent together with the coupon its prompt advertises.
pub async fn find_with_coupon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<(agent::Model, Option<coupon::Model>), AppError> {
    agent::Entity::find_by_id(id)
        .find_also_related(coupon::Entity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Agent not found!"))
}

pub async fn find_by_type_and_name<C: ConnectionTrait>(
    db: &C,
    r#type: &str,
    name: &str,
) -> Result<Option<agent::Model>, AppError> {
    Ok(agent::Entity::find()
        .filter(agent::Column::Type.eq(r#type))
        .filter(agent::Column::Name.eq(name))
        .one(db)
        .await?)
}

/// Upsert keyed by `(type, name)`.
pub async fn create_or_update<C: ConnectionTrait>(
    db: &C,
    input: AgentInput,
) -> Result<agent::Model, AppError> {
    let existing = find_by_type_and_name(db, &input.r#type, &input.name).await?;
    let mut active = match existing {
        Some(model) => model.into_active_model(),
        None => agent::ActiveModel {
            name: Set(input.name.clone()),
            r#type: Set(input.r#type.clone()),
            status_id: Set(Status::Active.id()),
            ..Default::default()
        },
    };
    active.prompt = Set(input.prompt);
    active.email_subject_format = Set(input.email_subject_format);
    active.coupon_id = Set(input.coupon_id);
    if let Some(status_id) = input.status_id {
        active.status_id = Set(status_id);
    }
    Ok(active.save(db).await?.try_into_model()?)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: AgentInput,
) -> Result<agent::Model, AppError> {
    let existing = find_by_id(db, id).await?;
    if let Some(other) = find_by_type_and_name(db, &input.r#type, &input.name).await? {
        if other.id != existing.id {
            return Err(AppError::Conflict("Agent already exists!".to_string()));
        }
    }
    let mut active = existing.into_active_model();
    active.name = Set(input.name);
    active.r#type = Set(input.r#type);
    active.prompt = Set(input.prompt);
    active.email_subject_format = Set(input.email_subject_format);
    active.coupon_id = Set(input.coupon_id);
    if let Some(status_id) = input.status_id {
        active.status_id = Set(status_id);
    }
    Ok(active.update(db).await?)
}

/// Copies an agent under the name "<name> - Copy".
pub async fn duplicate<C: ConnectionTrait>(db: &C, id: i32) -> Result<agent::Model, AppError> {
    let source = find_by_id(db, id).await?;
    let name = format!("{} - Copy", source.name);
    if find_by_type_and_name(db, &source.r#type, &name).await?.is_some() {
        return Err(AppError::Conflict("Agent already exists!".to_string()));
    }
    let copy = agent::ActiveModel {
        name: Set(name),
        r#type: Set(source.r#type),
        prompt: Set(source.prompt),
        status_id: Set(source.status_id),
        email_subject_format: Set(source.email_subject_format),
        coupon_id: Set(source.coupon_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(copy)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    r#type: Option<&str>,
) -> Result<Vec<agent::Model>, AppError> {
    let mut query = agent::Entity::find();
    if let Some(kind) = r#type.filter(|kind| !kind.trim().is_empty()) {
        query = query.filter(agent::Column::Type.eq(kind));
    }
    Ok(query.order_by_desc(agent::Column::UpdatedAt).all(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let result = agent::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Agent not found!"));
    }
    Ok(())
}
