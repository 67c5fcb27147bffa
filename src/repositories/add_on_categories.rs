use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::{database::models::add_on_category, errors::AppError};

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<add_on_category::Model, AppError> {
    add_on_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("AddOn Category not found!"))
}

async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<add_on_category::Model>, AppError> {
    Ok(add_on_category::Entity::find()
        .filter(add_on_category::Column::Name.eq(name.trim()))
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<add_on_category::Model, AppError> {
    if find_by_name(db, name).await?.is_some() {
        return Err(AppError::Conflict("AddOn Category already exists!".to_string()));
    }
    let created = add_on_category::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    name: &str,
) -> Result<add_on_category::Model, AppError> {
    let existing = find_by_id(db, id).await?;
    if let Some(other) = find_by_name(db, name).await? {
        if other.id != existing.id {
            return Err(AppError::Conflict("AddOn Category already exists!".to_string()));
        }
    }
    let mut active = existing.into_active_model();
    active.name = Set(name.trim().to_string());
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<add_on_category::Model>, AppError> {
    Ok(add_on_category::Entity::find()
        .order_by_desc(add_on_category::Column::UpdatedAt)
        .all(db)
        .await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let result = add_on_category::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("AddOn Category not found!"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn duplicate_category_name_is_rejected() {
        let db = test_db().await;
        create(&db, "Interior").await.unwrap();

        let err = create(&db, "Interior").await.unwrap_err();
        assert_eq!(err.to_string(), "AddOn Category already exists!");
    }

    #[tokio::test]
    async fn renaming_onto_another_category_is_rejected() {
        let db = test_db().await;
        create(&db, "Interior").await.unwrap();
        let exterior = create(&db, "Exterior").await.unwrap();

        assert!(update(&db, exterior.id, "Interior").await.is_err());
        let renamed = update(&db, exterior.id, "Exterior Plus").await.unwrap();
        assert_eq!(renamed.name, "Exterior Plus");
    }
}
