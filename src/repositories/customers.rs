use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    database::{models::customer, types::Status},
    errors::AppError,
    repositories::{PageRequest, Paged, is_unique_violation, like_pattern},
    services::formatting::normalize_phone,
};

/// Fields accepted when creating a customer. `password` is already hashed.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub status_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub status_id: Option<i32>,
    pub query: Option<String>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<customer::Model, AppError> {
    customer::Entity::find_by_id(id)
        .filter(customer::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found!"))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<customer::Model>, AppError> {
    Ok(customer::Entity::find()
        .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
        .filter(customer::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

/// Login lookup: only active, not deleted accounts.
pub async fn find_active_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<customer::Model>, AppError> {
    Ok(customer::Entity::find()
        .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
        .filter(customer::Column::StatusId.eq(Status::Active.id()))
        .filter(customer::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

pub async fn find_by_phone<C: ConnectionTrait>(
    db: &C,
    phone: &str,
) -> Result<Option<customer::Model>, AppError> {
    Ok(customer::Entity::find()
        .filter(customer::Column::Phone.eq(normalize_phone(phone)))
        .filter(customer::Column::DeletedAt.is_null())
        .order_by_desc(customer::Column::UpdatedAt)
        .one(db)
        .await?)
}

fn active_model_from(new: NewCustomer) -> customer::ActiveModel {
    customer::ActiveModel {
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(new.email.map(|email| email.trim().to_lowercase())),
        phone: Set(new.phone.as_deref().map(normalize_phone)),
        password: Set(new.password),
        address: Set(new.address),
        city: Set(new.city),
        state: Set(new.state),
        zip_code: Set(new.zip_code),
        status_id: Set(Status::Active.id()),
        allow_sms: Set(true),
        ..Default::default()
    }
}

/// Idempotent by email: an existing customer is returned untouched.
/// The flag is `true` when a row was inserted.
pub async fn create_or_get<C: ConnectionTrait>(
    db: &C,
    new: NewCustomer,
) -> Result<(customer::Model, bool), AppError> {
    if let Some(email) = new.email.as_deref() {
        if let Some(existing) = find_by_email(db, email).await? {
            return Ok((existing, false));
        }
    }

    let email = new.email.clone();
    match active_model_from(new).insert(db).await {
        Ok(created) => Ok((created, true)),
        Err(err) if is_unique_violation(&err) => {
            let email = email.ok_or(AppError::DbError(err))?;
            let existing = find_by_email(db, &email)
                .await?
                .ok_or_else(|| AppError::not_found("Customer not found!"))?;
            Ok((existing, false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Phone-only lead capture: merges onto the customer holding this phone or inserts one.
pub async fn upsert_by_phone<C: ConnectionTrait>(
    db: &C,
    phone: &str,
    patch: CustomerPatch,
) -> Result<customer::Model, AppError> {
    match find_by_phone(db, phone).await? {
        Some(existing) => update(db, existing, patch).await,
        None => {
            let new = NewCustomer {
                first_name: patch.first_name,
                last_name: patch.last_name,
                email: patch.email,
                phone: Some(phone.to_string()),
                password: patch.password,
                address: patch.address,
                city: patch.city,
                state: patch.state,
                zip_code: patch.zip_code,
            };
            Ok(active_model_from(new).insert(db).await?)
        }
    }
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    existing: customer::Model,
    patch: CustomerPatch,
) -> Result<customer::Model, AppError> {
    let mut active = existing.into_active_model();
    if let Some(v) = patch.first_name {
        active.first_name = Set(Some(v));
    }
    if let Some(v) = patch.last_name {
        active.last_name = Set(Some(v));
    }
    if let Some(v) = patch.email {
        active.email = Set(Some(v.trim().to_lowercase()));
    }
    if let Some(v) = patch.phone {
        active.phone = Set(Some(normalize_phone(&v)));
    }
    if let Some(v) = patch.password {
        active.password = Set(Some(v));
    }
    if let Some(v) = patch.address {
        active.address = Set(Some(v));
    }
    if let Some(v) = patch.city {
        active.city = Set(Some(v));
    }
    if let Some(v) = patch.state {
        active.state = Set(Some(v));
    }
    if let Some(v) = patch.zip_code {
        active.zip_code = Set(Some(v));
    }
    if let Some(v) = patch.status_id {
        active.status_id = Set(v);
    }
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: &CustomerFilter,
    page: PageRequest,
) -> Result<Paged<customer::Model>, AppError> {
    let mut query = customer::Entity::find().filter(customer::Column::DeletedAt.is_null());

    if let Some(status_id) = filter.status_id {
        query = query.filter(customer::Column::StatusId.eq(status_id));
    }
    if let Some(pattern) = like_pattern(filter.query.as_deref()) {
        query = query.filter(
            Condition::any()
                .add(customer::Column::FirstName.like(pattern.clone()))
                .add(customer::Column::LastName.like(pattern.clone()))
                .add(customer::Column::Email.like(pattern.clone()))
                .add(customer::Column::Phone.like(pattern)),
        );
    }

    let paginator = query
        .order_by_desc(customer::Column::CreatedAt)
        .paginate(db, page.page_size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(page.page_index()).await?;
    Ok(Paged { rows, count })
}

pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let existing = find_by_id(db, id).await?;
    let mut active = existing.into_active_model();
    active.deleted_at = Set(Some(chrono::Utc::now()));
    active.update(db).await?;
    Ok(())
}

pub async fn set_allow_sms<C: ConnectionTrait>(
    db: &C,
    id: i32,
    allow: bool,
) -> Result<customer::Model, AppError> {
    let existing = find_by_id(db, id).await?;
    let mut active = existing.into_active_model();
    active.allow_sms = Set(allow);
    Ok(active.update(db).await?)
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    existing: customer::Model,
    password_hash: String,
) -> Result<customer::Model, AppError> {
    let mut active = existing.into_active_model();
    active.password = Set(Some(password_hash));
    active.pass_reset_at = Set(None);
    Ok(active.update(db).await?)
}

pub async fn set_pass_reset_at<C: ConnectionTrait>(
    db: &C,
    existing: customer::Model,
    at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<customer::Model, AppError> {
    let mut active = existing.into_active_model();
    active.pass_reset_at = Set(at);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn jane() -> NewCustomer {
        NewCustomer {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some("Jane@Example.com".into()),
            phone: Some("(555) 010-2000".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_with_registered_email_returns_existing_row() {
        let db = test_db().await;

        let (first, created) = create_or_get(&db, jane()).await.unwrap();
        assert!(created);
        assert_eq!(first.email.as_deref(), Some("jane@example.com"));
        assert_eq!(first.phone.as_deref(), Some("5550102000"));

        let mut again = jane();
        again.first_name = Some("Someone else".into());
        let (second, created) = create_or_get(&db, again).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.first_name.as_deref(), Some("Jane"));
        assert_eq!(customer::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn phone_leads_merge_on_normalised_phone() {
        let db = test_db().await;

        let lead = upsert_by_phone(&db, "555-010-3000", CustomerPatch::default())
            .await
            .unwrap();
        let merged = upsert_by_phone(
            &db,
            "(555) 010 3000",
            CustomerPatch {
                first_name: Some("Sam".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(lead.id, merged.id);
        assert_eq!(merged.first_name.as_deref(), Some("Sam"));
        assert!(merged.email.is_none());
    }

    #[tokio::test]
    async fn soft_deleted_customers_disappear_from_lookups() {
        let db = test_db().await;
        let (created, _) = create_or_get(&db, jane()).await.unwrap();

        soft_delete(&db, created.id).await.unwrap();

        assert!(find_by_id(&db, created.id).await.is_err());
        let page = list(&db, &CustomerFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
        // the row itself is kept
        assert!(
            customer::Entity::find_by_id(created.id)
                .one(&db)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn list_filters_by_search_term() {
        let db = test_db().await;
        create_or_get(&db, jane()).await.unwrap();
        create_or_get(
            &db,
            NewCustomer {
                first_name: Some("Bob".into()),
                email: Some("bob@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let filter = CustomerFilter {
            status_id: Some(Status::Active.id()),
            query: Some("bob".into()),
        };
        let page = list(&db, &filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.rows[0].first_name.as_deref(), Some("Bob"));
    }
}
