use chrono::{Datelike, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::{database::models::timeslot, errors::AppError};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<timeslot::Model, AppError> {
    timeslot::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Timeslot not found!"))
}

async fn find_by_key<C: ConnectionTrait>(
    db: &C,
    time: &str,
    days: &str,
) -> Result<Option<timeslot::Model>, AppError> {
    Ok(timeslot::Entity::find()
        .filter(timeslot::Column::Time.eq(time))
        .filter(timeslot::Column::Days.eq(days))
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    time: &str,
    days: &str,
) -> Result<timeslot::Model, AppError> {
    let (time, days) = (time.trim(), days.trim());
    if find_by_key(db, time, days).await?.is_some() {
        return Err(AppError::Conflict("Timeslot already exists!".to_string()));
    }
    let created = timeslot::ActiveModel {
        time: Set(time.to_string()),
        days: Set(days.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Option<i32>,
    time: &str,
    days: &str,
) -> Result<timeslot::Model, AppError> {
    let id = id.ok_or_else(|| AppError::invalid("Timeslot ID is required!"))?;
    let existing = find_by_id(db, id).await?;
    let (time, days) = (time.trim(), days.trim());
    if let Some(other) = find_by_key(db, time, days).await? {
        if other.id != existing.id {
            return Err(AppError::Conflict("Timeslot already exists!".to_string()));
        }
    }
    let mut active = existing.into_active_model();
    active.time = Set(time.to_string());
    active.days = Set(days.to_string());
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<timeslot::Model>, AppError> {
    Ok(timeslot::Entity::find()
        .order_by_asc(timeslot::Column::Id)
        .all(db)
        .await?)
}

/// Timeslots offered on the weekday of `date` (0 = Sunday).
pub async fn list_for_date<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
) -> Result<Vec<timeslot::Model>, AppError> {
    let weekday = date.weekday().num_days_from_sunday();
    Ok(list(db)
        .await?
        .into_iter()
        .filter(|slot| slot.runs_on(weekday))
        .collect())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let result = timeslot::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Timeslot not found!"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn duplicate_time_and_days_is_rejected() {
        let db = test_db().await;
        create(&db, "09:00 AM", "1,2,3").await.unwrap();

        let err = create(&db, "09:00 AM", "1,2,3").await.unwrap_err();
        assert_eq!(err.to_string(), "Timeslot already exists!");

        // same time on other days is a different slot
        create(&db, "09:00 AM", "6").await.unwrap();
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let db = test_db().await;
        let err = update(&db, None, "10:00 AM", "1").await.unwrap_err();
        assert_eq!(err.to_string(), "Timeslot ID is required!");

        let err = update(&db, Some(999), "10:00 AM", "1").await.unwrap_err();
        assert_eq!(err.to_string(), "Timeslot not found!");
    }

    #[tokio::test]
    async fn slots_are_filtered_by_weekday() {
        let db = test_db().await;
        create(&db, "09:00 AM", "1,3,5").await.unwrap();
        create(&db, "01:00 PM", "0,6").await.unwrap();

        // 2024-06-03 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let slots = list_for_date(&db, monday).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].time, "09:00 AM");

        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let slots = list_for_date(&db, sunday).await.unwrap();
        assert_eq!(slots[0].time, "01:00 PM");
    }
}
