use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::{
    database::models::{package, service, service_package},
    errors::AppError,
    repositories::diff_ids,
};

#[derive(Debug, Clone)]
pub struct ServiceInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_popular: bool,
    pub package_ids: Vec<i32>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<service::Model, AppError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Service not found!"))
}

pub async fn packages_of<C: ConnectionTrait>(
    db: &C,
    service_id: i32,
) -> Result<Vec<package::Model>, AppError> {
    let rows = service_package::Entity::find()
        .filter(service_package::Column::ServiceId.eq(service_id))
        .find_also_related(package::Entity)
        .all(db)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, package)| package).collect())
}

async fn sync_packages<C: ConnectionTrait>(
    db: &C,
    service_id: i32,
    wanted: &[i32],
) -> Result<(), AppError> {
    let existing: Vec<i32> = service_package::Entity::find()
        .filter(service_package::Column::ServiceId.eq(service_id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.package_id)
        .collect();

    let (removed, added) = diff_ids(&existing, wanted);
    if !removed.is_empty() {
        service_package::Entity::delete_many()
            .filter(service_package::Column::ServiceId.eq(service_id))
            .filter(service_package::Column::PackageId.is_in(removed))
            .exec(db)
            .await?;
    }
    for package_id in added {
        service_package::ActiveModel {
            service_id: Set(service_id),
            package_id: Set(package_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: ServiceInput,
) -> Result<service::Model, AppError> {
    let created = service::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        image: Set(input.image),
        is_popular: Set(input.is_popular),
        ..Default::default()
    }
    .insert(db)
    .await?;
    sync_packages(db, created.id, &input.package_ids).await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: ServiceInput,
) -> Result<service::Model, AppError> {
    let mut active = find_by_id(db, id).await?.into_active_model();
    active.name = Set(input.name);
    active.description = Set(input.description);
    active.image = Set(input.image);
    active.is_popular = Set(input.is_popular);
    let updated = active.update(db).await?;
    sync_packages(db, updated.id, &input.package_ids).await?;
    Ok(updated)
}

pub async fn set_popular<C: ConnectionTrait>(
    db: &C,
    id: i32,
    is_popular: bool,
) -> Result<service::Model, AppError> {
    let mut active = find_by_id(db, id).await?.into_active_model();
    active.is_popular = Set(is_popular);
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<service::Model>, AppError> {
    Ok(service::Entity::find()
        .order_by_desc(service::Column::IsPopular)
        .order_by_asc(service::Column::Id)
        .all(db)
        .await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    service_package::Entity::delete_many()
        .filter(service_package::Column::ServiceId.eq(id))
        .exec(db)
        .await?;
    let result = service::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Service not found!"));
    }
    Ok(())
}
