use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::{
    database::models::coupon,
    errors::AppError,
    repositories::{PageRequest, Paged, like_pattern},
};

#[derive(Debug, Clone)]
pub struct CouponInput {
    pub code: String,
    pub description: String,
    pub discount_amount: f64,
    pub discount_percentage: f64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<coupon::Model, AppError> {
    coupon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Coupon not found!"))
}

async fn find_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<coupon::Model>, AppError> {
    Ok(coupon::Entity::find()
        .filter(coupon::Column::Code.eq(code.trim()))
        .one(db)
        .await?)
}

/// A coupon is only redeemable inside its `[start_at, end_at]` window.
pub fn ensure_redeemable(coupon: &coupon::Model, now: DateTime<Utc>) -> Result<(), AppError> {
    if coupon.end_at < now {
        return Err(AppError::invalid("Coupon has expired!"));
    }
    if coupon.start_at > now {
        return Err(AppError::invalid("Coupon is not active yet!"));
    }
    Ok(())
}

pub async fn find_redeemable_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<coupon::Model, AppError> {
    let coupon = find_by_code(db, code)
        .await?
        .ok_or_else(|| AppError::not_found("Coupon not found!"))?;
    ensure_redeemable(&coupon, Utc::now())?;
    Ok(coupon)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: CouponInput,
) -> Result<coupon::Model, AppError> {
    if find_by_code(db, &input.code).await?.is_some() {
        return Err(AppError::Conflict("Coupon already exists!".to_string()));
    }
    let created = coupon::ActiveModel {
        code: Set(input.code.trim().to_string()),
        description: Set(input.description),
        discount_amount: Set(input.discount_amount),
        discount_percentage: Set(input.discount_percentage),
        start_at: Set(input.start_at),
        end_at: Set(input.end_at),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Option<i32>,
    input: CouponInput,
) -> Result<coupon::Model, AppError> {
    let id = id.ok_or_else(|| AppError::invalid("Coupon ID not provided!"))?;
    let existing = find_by_id(db, id).await?;
    if let Some(other) = find_by_code(db, &input.code).await? {
        if other.id != existing.id {
            return Err(AppError::Conflict("Coupon code already exists!".to_string()));
        }
    }

    let mut active = existing.into_active_model();
    active.code = Set(input.code.trim().to_string());
    active.description = Set(input.description);
    active.discount_amount = Set(input.discount_amount);
    active.discount_percentage = Set(input.discount_percentage);
    active.start_at = Set(input.start_at);
    active.end_at = Set(input.end_at);
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    code: Option<&str>,
    page: PageRequest,
) -> Result<Paged<coupon::Model>, AppError> {
    let mut query = coupon::Entity::find();
    if let Some(pattern) = like_pattern(code) {
        query = query.filter(coupon::Column::Code.like(pattern));
    }
    let paginator = query
        .order_by_desc(coupon::Column::CreatedAt)
        .paginate(db, page.page_size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(page.page_index()).await?;
    Ok(Paged { rows, count })
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let result = coupon::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Coupon not found!"));
    }
    Ok(())
}
