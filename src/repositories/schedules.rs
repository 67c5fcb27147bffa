use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::{
    database::{models::schedule, types::Status},
    errors::AppError,
};

/// Upsert keyed by `(customer, date, timeslot)`. An existing slot is returned as is.
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    date: NaiveDate,
    timeslot_id: i32,
) -> Result<schedule::Model, AppError> {
    let existing = schedule::Entity::find()
        .filter(schedule::Column::CustomerId.eq(customer_id))
        .filter(schedule::Column::Date.eq(date))
        .filter(schedule::Column::TimeslotId.eq(timeslot_id))
        .lock_exclusive()
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    let created = schedule::ActiveModel {
        customer_id: Set(customer_id),
        date: Set(date),
        timeslot_id: Set(timeslot_id),
        status_id: Set(Status::Active.id()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}
