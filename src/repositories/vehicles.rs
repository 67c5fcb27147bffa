use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect, Set,
};

use crate::{
    database::models::vehicle,
    errors::AppError,
    repositories::is_unique_violation,
};

#[derive(Debug, Clone)]
pub struct VehicleInput {
    pub r#type: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
}

fn apply(active: &mut vehicle::ActiveModel, input: VehicleInput) {
    active.r#type = Set(input.r#type);
    active.make = Set(input.make);
    active.model = Set(input.model);
    active.year = Set(input.year);
    if input.vin.is_some() {
        active.vin = Set(input.vin);
    }
    if input.license_plate.is_some() {
        active.license_plate = Set(input.license_plate);
    }
    if input.color.is_some() {
        active.color = Set(input.color);
    }
}

pub async fn find_by_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
) -> Result<Option<vehicle::Model>, AppError> {
    Ok(vehicle::Entity::find()
        .filter(vehicle::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?)
}

/// One current vehicle per customer: a later submission overwrites the row.
pub async fn upsert_for_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    input: VehicleInput,
) -> Result<vehicle::Model, AppError> {
    let existing = vehicle::Entity::find()
        .filter(vehicle::Column::CustomerId.eq(customer_id))
        .lock_exclusive()
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let mut active = existing.into_active_model();
        apply(&mut active, input);
        return Ok(active.update(db).await?);
    }

    let mut active = vehicle::ActiveModel {
        customer_id: Set(customer_id),
        ..Default::default()
    };
    apply(&mut active, input.clone());
    match active.insert(db).await {
        Ok(created) => Ok(created),
        Err(err) if is_unique_violation(&err) => {
            let existing = find_by_customer(db, customer_id)
                .await?
                .ok_or(AppError::DbError(err))?;
            let mut active = existing.into_active_model();
            apply(&mut active, input);
            Ok(active.update(db).await?)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn list_for_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
) -> Result<Vec<vehicle::Model>, AppError> {
    Ok(vehicle::Entity::find()
        .filter(vehicle::Column::CustomerId.eq(customer_id))
        .all(db)
        .await?)
}
