use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::{database::models::add_on, errors::AppError};

#[derive(Debug, Clone)]
pub struct AddOnInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: i32,
    pub image: Option<String>,
    pub category_id: Option<i32>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<add_on::Model, AppError> {
    add_on::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("AddOn not found!"))
}

pub async fn find_many<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> Result<Vec<add_on::Model>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(add_on::Entity::find()
        .filter(add_on::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(db: &C, input: AddOnInput) -> Result<add_on::Model, AppError> {
    let created = add_on::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        duration: Set(input.duration),
        image: Set(input.image),
        category_id: Set(input.category_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: AddOnInput,
) -> Result<add_on::Model, AppError> {
    let mut active = find_by_id(db, id).await?.into_active_model();
    active.name = Set(input.name);
    active.description = Set(input.description);
    active.price = Set(input.price);
    active.duration = Set(input.duration);
    active.image = Set(input.image);
    active.category_id = Set(input.category_id);
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    category_id: Option<i32>,
) -> Result<Vec<add_on::Model>, AppError> {
    let mut query = add_on::Entity::find();
    if let Some(category_id) = category_id {
        query = query.filter(add_on::Column::CategoryId.eq(category_id));
    }
    Ok(query.order_by_desc(add_on::Column::UpdatedAt).all(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let result = add_on::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("AddOn not found!"));
    }
    Ok(())
}
