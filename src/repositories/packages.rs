use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::{
    database::models::{add_on, package, package_add_on},
    errors::AppError,
    repositories::diff_ids,
};

#[derive(Debug, Clone)]
pub struct PackageInput {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub add_on_ids: Vec<i32>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<package::Model, AppError> {
    package::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Package not found!"))
}

pub async fn add_ons_of<C: ConnectionTrait>(
    db: &C,
    package_id: i32,
) -> Result<Vec<add_on::Model>, AppError> {
    let rows = package_add_on::Entity::find()
        .filter(package_add_on::Column::PackageId.eq(package_id))
        .find_also_related(add_on::Entity)
        .all(db)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, add_on)| add_on).collect())
}

/// Brings the join rows for `package_id` in line with `wanted`.
async fn sync_add_ons<C: ConnectionTrait>(
    db: &C,
    package_id: i32,
    wanted: &[i32],
) -> Result<(), AppError> {
    let existing: Vec<i32> = package_add_on::Entity::find()
        .filter(package_add_on::Column::PackageId.eq(package_id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.add_on_id)
        .collect();

    let (removed, added) = diff_ids(&existing, wanted);
    if !removed.is_empty() {
        package_add_on::Entity::delete_many()
            .filter(package_add_on::Column::PackageId.eq(package_id))
            .filter(package_add_on::Column::AddOnId.is_in(removed))
            .exec(db)
            .await?;
    }
    for add_on_id in added {
        package_add_on::ActiveModel {
            package_id: Set(package_id),
            add_on_id: Set(add_on_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: PackageInput,
) -> Result<package::Model, AppError> {
    let created = package::ActiveModel {
        name: Set(input.name),
        display_name: Set(input.display_name),
        description: Set(input.description),
        price: Set(input.price),
        image: Set(input.image),
        ..Default::default()
    }
    .insert(db)
    .await?;
    sync_add_ons(db, created.id, &input.add_on_ids).await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: PackageInput,
) -> Result<package::Model, AppError> {
    let mut active = find_by_id(db, id).await?.into_active_model();
    active.name = Set(input.name);
    active.display_name = Set(input.display_name);
    active.description = Set(input.description);
    active.price = Set(input.price);
    active.image = Set(input.image);
    let updated = active.update(db).await?;
    sync_add_ons(db, updated.id, &input.add_on_ids).await?;
    Ok(updated)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<package::Model>, AppError> {
    Ok(package::Entity::find()
        .order_by_asc(package::Column::Id)
        .all(db)
        .await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    package_add_on::Entity::delete_many()
        .filter(package_add_on::Column::PackageId.eq(id))
        .exec(db)
        .await?;
    let result = package::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Package not found!"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_add_on, test_db};

    fn input(add_on_ids: Vec<i32>) -> PackageInput {
        PackageInput {
            name: "gold".into(),
            display_name: "Gold".into(),
            description: "Full detail".into(),
            price: "199".into(),
            image: None,
            add_on_ids,
        }
    }

    #[tokio::test]
    async fn update_syncs_package_add_ons() {
        let db = test_db().await;
        let wax = seed_add_on(&db, "Wax").await;
        let shampoo = seed_add_on(&db, "Shampoo").await;
        let clay = seed_add_on(&db, "Clay bar").await;

        let created = create(&db, input(vec![wax.id, shampoo.id])).await.unwrap();
        update(&db, created.id, input(vec![shampoo.id, clay.id]))
            .await
            .unwrap();

        let mut names: Vec<String> = add_ons_of(&db, created.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Clay bar".to_string(), "Shampoo".to_string()]);
    }
}
