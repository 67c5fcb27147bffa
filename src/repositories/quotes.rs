use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use crate::{
    database::{models::quote, types::Status},
    errors::AppError,
};

/// Quotes have no natural key; every booking adds one.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    quoted_amount: &str,
) -> Result<quote::Model, AppError> {
    let created = quote::ActiveModel {
        quote_date: Set(chrono::Utc::now()),
        quoted_amount: Set(quoted_amount.to_string()),
        status_id: Set(Status::Active.id()),
        customer_id: Set(customer_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}
