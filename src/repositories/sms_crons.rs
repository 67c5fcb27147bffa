use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set};

use crate::{database::models::sms_cron, errors::AppError};

/// Records that the recipient of a scheduled SMS replied. Missing rows are ignored.
pub async fn mark_clicked<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<sms_cron::Model>, AppError> {
    let Some(cron) = sms_cron::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    if cron.clicked {
        return Ok(Some(cron));
    }
    let mut active = cron.into_active_model();
    active.clicked = Set(true);
    Ok(Some(active.update(db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::types::Status, test_support::test_db};

    #[tokio::test]
    async fn marks_existing_cron_and_ignores_missing() {
        let db = test_db().await;
        let cron = sms_cron::ActiveModel {
            status_id: Set(Status::Active.id()),
            clicked: Set(false),
            purchase: Set(false),
            failed: Set(false),
            stopped: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let updated = mark_clicked(&db, cron.id).await.unwrap().unwrap();
        assert!(updated.clicked);
        assert!(mark_clicked(&db, cron.id + 100).await.unwrap().is_none());
    }
}
