use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    database::{models::employee, types::Status},
    errors::AppError,
    repositories::{PageRequest, Paged, like_pattern},
};

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// bcrypt hash.
    pub password: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub position: Option<String>,
    pub status_id: Option<i32>,
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<employee::Model, AppError> {
    employee::Entity::find_by_id(id)
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found!"))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<employee::Model>, AppError> {
    Ok(employee::Entity::find()
        .filter(employee::Column::Email.eq(email.trim().to_lowercase()))
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

pub async fn find_active_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<employee::Model>, AppError> {
    Ok(employee::Entity::find()
        .filter(employee::Column::Email.eq(email.trim().to_lowercase()))
        .filter(employee::Column::StatusId.eq(Status::Active.id()))
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    new: NewEmployee,
) -> Result<employee::Model, AppError> {
    if find_by_email(db, &new.email).await?.is_some() {
        return Err(AppError::Conflict("Employee already exists".to_string()));
    }

    let created = employee::ActiveModel {
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(new.email.trim().to_lowercase()),
        phone: Set(new.phone),
        password: Set(new.password),
        position: Set(new.position),
        status_id: Set(Status::Active.id()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    patch: EmployeePatch,
) -> Result<employee::Model, AppError> {
    let existing = find_by_id(db, id).await?;

    if let Some(email) = patch.email.as_deref() {
        if let Some(other) = find_by_email(db, email).await? {
            if other.id != existing.id {
                return Err(AppError::Conflict("Employee already exists".to_string()));
            }
        }
    }

    let mut active = existing.into_active_model();
    if let Some(v) = patch.first_name {
        active.first_name = Set(v);
    }
    if let Some(v) = patch.last_name {
        active.last_name = Set(v);
    }
    if let Some(v) = patch.email {
        active.email = Set(v.trim().to_lowercase());
    }
    if let Some(v) = patch.phone {
        active.phone = Set(Some(v));
    }
    if let Some(v) = patch.password {
        active.password = Set(v);
    }
    if let Some(v) = patch.position {
        active.position = Set(Some(v));
    }
    if let Some(v) = patch.status_id {
        active.status_id = Set(v);
    }
    Ok(active.update(db).await?)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    query_string: Option<&str>,
    page: PageRequest,
) -> Result<Paged<employee::Model>, AppError> {
    let mut query = employee::Entity::find().filter(employee::Column::DeletedAt.is_null());
    if let Some(pattern) = like_pattern(query_string) {
        query = query.filter(
            Condition::any()
                .add(employee::Column::FirstName.like(pattern.clone()))
                .add(employee::Column::LastName.like(pattern.clone()))
                .add(employee::Column::Email.like(pattern)),
        );
    }
    let paginator = query
        .order_by_desc(employee::Column::CreatedAt)
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

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    existing: employee::Model,
    password_hash: String,
) -> Result<employee::Model, AppError> {
    let mut active = existing.into_active_model();
    active.password = Set(password_hash);
    active.pass_reset_at = Set(None);
    Ok(active.update(db).await?)
}

pub async fn set_pass_reset_at<C: ConnectionTrait>(
    db: &C,
    existing: employee::Model,
    at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<employee::Model, AppError> {
    let mut active = existing.into_active_model();
    active.pass_reset_at = Set(at);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn mike() -> NewEmployee {
        NewEmployee {
            first_name: "Mike".into(),
            last_name: "Ross".into(),
            email: "mike@example.com".into(),
            phone: None,
            password: "hash".into(),
            position: Some("DETAILER".into()),
        }
    }

    #[tokio::test]
    async fn duplicate_employee_is_rejected() {
        let db = test_db().await;
        create(&db, mike()).await.unwrap();

        let err = create(&db, mike()).await.unwrap_err();
        assert_eq!(err.to_string(), "Employee already exists");
    }

    #[tokio::test]
    async fn soft_delete_keeps_the_row() {
        let db = test_db().await;
        let created = create(&db, mike()).await.unwrap();

        soft_delete(&db, created.id).await.unwrap();

        assert!(find_by_id(&db, created.id).await.is_err());
        let raw = employee::Entity::find_by_id(created.id).one(&db).await.unwrap();
        assert!(raw.and_then(|row| row.deleted_at).is_some());
    }
}
