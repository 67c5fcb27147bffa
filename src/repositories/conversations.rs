use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    IntoActiveModel, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    database::models::{agent, customer, sms_conversation, sms_message},
    errors::AppError,
    repositories::{PageRequest, Paged, is_unique_violation, like_pattern},
    services::formatting::normalize_phone,
};

/// Fields written by `create_or_update`; `None` leaves a column untouched on update.
#[derive(Debug, Clone, Default)]
pub struct ConversationInput {
    pub contact: String,
    pub did: String,
    pub last_message: Option<String>,
    pub test: Option<serde_json::Value>,
    pub is_agent_active: Option<bool>,
    pub customer_id: Option<i32>,
    pub agent_id: Option<i32>,
    pub sms_cron_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    pub last_message: Option<String>,
    pub is_agent_active: Option<bool>,
    pub customer_id: Option<i32>,
    pub agent_id: Option<i32>,
    pub test: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    /// `Some(true)` only test conversations, `Some(false)` only real ones.
    pub test: Option<bool>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: sms_conversation::Model,
    pub customer: Option<customer::Model>,
    pub agent: Option<agent::Model>,
    pub unread_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct UnreadRow {
    id: i32,
    unread_count: i64,
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<sms_conversation::Model, AppError> {
    sms_conversation::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation not found!"))
}

/// Conversation for an inbound number on our DID, most recently active first.
pub async fn find_by_phone<C: ConnectionTrait>(
    db: &C,
    from: &str,
    did: &str,
) -> Result<Option<sms_conversation::Model>, AppError> {
    Ok(sms_conversation::Entity::find()
        .filter(sms_conversation::Column::Contact.eq(normalize_phone(from)))
        .filter(sms_conversation::Column::Did.eq(did))
        .order_by_desc(sms_conversation::Column::UpdatedAt)
        .one(db)
        .await?)
}

fn apply(active: &mut sms_conversation::ActiveModel, input: ConversationInput) {
    if let Some(v) = input.last_message {
        active.last_message = Set(v);
    }
    if let Some(v) = input.test {
        active.test = Set(Some(v));
    }
    if let Some(v) = input.is_agent_active {
        active.is_agent_active = Set(v);
    }
    if let Some(v) = input.customer_id {
        active.customer_id = Set(Some(v));
    }
    if let Some(v) = input.agent_id {
        active.agent_id = Set(Some(v));
    }
    if let Some(v) = input.sms_cron_id {
        active.sms_cron_id = Set(Some(v));
    }
}

/// Upsert keyed by the normalised `(contact, did)` pair.
pub async fn create_or_update<C: ConnectionTrait>(
    db: &C,
    input: ConversationInput,
) -> Result<sms_conversation::Model, AppError> {
    let contact = normalize_phone(&input.contact);
    let existing = sms_conversation::Entity::find()
        .filter(sms_conversation::Column::Contact.eq(contact.as_str()))
        .filter(sms_conversation::Column::Did.eq(input.did.as_str()))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let mut active = existing.into_active_model();
        apply(&mut active, input);
        return Ok(active.update(db).await?);
    }

    let mut active = sms_conversation::ActiveModel {
        contact: Set(contact.clone()),
        did: Set(input.did.clone()),
        last_message: Set(String::new()),
        is_agent_active: Set(true),
        ..Default::default()
    };
    apply(&mut active, input.clone());
    match active.insert(db).await {
        Ok(created) => Ok(created),
        Err(err) if is_unique_violation(&err) => {
            let existing = sms_conversation::Entity::find()
                .filter(sms_conversation::Column::Contact.eq(contact))
                .filter(sms_conversation::Column::Did.eq(input.did.as_str()))
                .one(db)
                .await?
                .ok_or(AppError::DbError(err))?;
            let mut active = existing.into_active_model();
            apply(&mut active, input);
            Ok(active.update(db).await?)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    patch: ConversationPatch,
) -> Result<sms_conversation::Model, AppError> {
    let mut active = find_by_id(db, id).await?.into_active_model();
    if let Some(v) = patch.last_message {
        active.last_message = Set(v);
    }
    if let Some(v) = patch.is_agent_active {
        active.is_agent_active = Set(v);
    }
    if let Some(v) = patch.customer_id {
        active.customer_id = Set(Some(v));
    }
    if let Some(v) = patch.agent_id {
        active.agent_id = Set(Some(v));
    }
    if let Some(v) = patch.test {
        active.test = Set(Some(v));
    }
    Ok(active.update(db).await?)
}

pub async fn set_agent_active<C: ConnectionTrait>(
    db: &C,
    id: i32,
    is_agent_active: bool,
) -> Result<sms_conversation::Model, AppError> {
    update(
        db,
        id,
        ConversationPatch {
            is_agent_active: Some(is_agent_active),
            ..Default::default()
        },
    )
    .await
}

pub async fn set_last_message<C: ConnectionTrait>(
    db: &C,
    conversation: sms_conversation::Model,
    message: &str,
) -> Result<sms_conversation::Model, AppError> {
    let mut active = conversation.into_active_model();
    active.last_message = Set(message.to_string());
    Ok(active.update(db).await?)
}

pub async fn add_message<C: ConnectionTrait>(
    db: &C,
    conversation_id: i32,
    to: &str,
    from: &str,
    message: &str,
    seen: bool,
) -> Result<sms_message::Model, AppError> {
    let created = sms_message::ActiveModel {
        to: Set(to.to_string()),
        from: Set(from.to_string()),
        message: Set(message.to_string()),
        seen: Set(seen),
        conversation_id: Set(conversation_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

/// Newest first.
pub async fn messages<C: ConnectionTrait>(
    db: &C,
    conversation_id: i32,
) -> Result<Vec<sms_message::Model>, AppError> {
    Ok(sms_message::Entity::find()
        .filter(sms_message::Column::ConversationId.eq(conversation_id))
        .order_by_desc(sms_message::Column::CreatedAt)
        .order_by_desc(sms_message::Column::Id)
        .all(db)
        .await?)
}

/// Oldest first, for prompt assembly.
pub async fn history<C: ConnectionTrait>(
    db: &C,
    conversation_id: i32,
) -> Result<Vec<sms_message::Model>, AppError> {
    Ok(sms_message::Entity::find()
        .filter(sms_message::Column::ConversationId.eq(conversation_id))
        .order_by_asc(sms_message::Column::CreatedAt)
        .order_by_asc(sms_message::Column::Id)
        .all(db)
        .await?)
}

/// Marks one message, or every message of the conversation, as seen.
pub async fn mark_seen<C: ConnectionTrait>(
    db: &C,
    conversation_id: i32,
    message_id: Option<i32>,
) -> Result<u64, AppError> {
    let mut query = sms_message::Entity::update_many()
        .col_expr(sms_message::Column::Seen, Expr::value(true))
        .filter(sms_message::Column::ConversationId.eq(conversation_id))
        .filter(sms_message::Column::Seen.eq(false));
    if let Some(message_id) = message_id {
        query = query.filter(sms_message::Column::Id.eq(message_id));
    }
    Ok(query.exec(db).await?.rows_affected)
}

pub async fn unseen_count<C: ConnectionTrait>(
    db: &C,
    conversation_id: Option<i32>,
) -> Result<u64, AppError> {
    let mut query = sms_message::Entity::find().filter(sms_message::Column::Seen.eq(false));
    if let Some(conversation_id) = conversation_id {
        query = query.filter(sms_message::Column::ConversationId.eq(conversation_id));
    }
    Ok(query.count(db).await?)
}

/// Unseen messages across the joined rows of one conversation.
fn unread_expr() -> SimpleExpr {
    Func::count(Expr::case(
        Expr::col((sms_message::Entity, sms_message::Column::Seen)).eq(false),
        Expr::val(1),
    ))
    .into()
}

/// Conversations ordered by unread count, then recency.
pub async fn list_with_unread<C: ConnectionTrait>(
    db: &C,
    filter: &ConversationFilter,
    page: PageRequest,
) -> Result<Paged<ConversationSummary>, AppError> {
    let mut query = sms_conversation::Entity::find()
        .select_only()
        .column(sms_conversation::Column::Id)
        .column_as(
            unread_expr(),
            "unread_count",
        )
        .join(JoinType::LeftJoin, sms_conversation::Relation::SmsMessage.def())
        .join(JoinType::LeftJoin, sms_conversation::Relation::Customer.def())
        .group_by(sms_conversation::Column::Id)
        .group_by(sms_conversation::Column::UpdatedAt);

    match filter.test {
        Some(true) => query = query.filter(sms_conversation::Column::Test.is_not_null()),
        Some(false) => query = query.filter(sms_conversation::Column::Test.is_null()),
        None => {}
    }
    if let Some(pattern) = like_pattern(filter.query.as_deref()) {
        query = query.filter(
            Condition::any()
                .add(sms_conversation::Column::Contact.like(pattern.clone()))
                .add(customer::Column::FirstName.like(pattern.clone()))
                .add(customer::Column::LastName.like(pattern.clone()))
                .add(customer::Column::Email.like(pattern)),
        );
    }

    let paginator = query
        .order_by_desc(Expr::cust("unread_count"))
        .order_by_desc(sms_conversation::Column::UpdatedAt)
        .into_model::<UnreadRow>()
        .paginate(db, page.page_size());
    let count = paginator.num_items().await?;
    let page_rows = paginator.fetch_page(page.page_index()).await?;

    let mut rows = Vec::with_capacity(page_rows.len());
    for row in page_rows {
        let conversation = find_by_id(db, row.id).await?;
        let customer = match conversation.customer_id {
            Some(id) => customer::Entity::find_by_id(id).one(db).await?,
            None => None,
        };
        let agent = match conversation.agent_id {
            Some(id) => agent::Entity::find_by_id(id).one(db).await?,
            None => None,
        };
        rows.push(ConversationSummary {
            conversation,
            customer,
            agent,
            unread_count: row.unread_count,
        });
    }
    Ok(Paged { rows, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn input(contact: &str) -> ConversationInput {
        ConversationInput {
            contact: contact.into(),
            did: "5559990000".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn contact_is_normalised_before_lookup_and_insert() {
        let db = test_db().await;
        let a = create_or_update(&db, input("(555) 010-4000")).await.unwrap();
        let b = create_or_update(&db, input("555 010 4000")).await.unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.contact, "5550104000");
        assert!(a.is_agent_active);

        let found = find_by_phone(&db, "555-010-4000", "5559990000").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(a.id));
    }

    #[test]
    fn unread_count_compares_seen_as_a_bool() {
        use sea_orm::sea_query::{PostgresQueryBuilder, Query};

        let sql = Query::select()
            .expr(unread_expr())
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("\"seen\" = FALSE"), "{}", sql);
        assert!(!sql.contains("= 0"), "{}", sql);
    }

    #[tokio::test]
    async fn unread_counts_drive_listing_order() {
        let db = test_db().await;
        let quiet = create_or_update(&db, input("5550000001")).await.unwrap();
        let busy = create_or_update(&db, input("5550000002")).await.unwrap();

        add_message(&db, quiet.id, "did", "5550000001", "hi", true).await.unwrap();
        add_message(&db, busy.id, "did", "5550000002", "one", false).await.unwrap();
        add_message(&db, busy.id, "did", "5550000002", "two", false).await.unwrap();

        let page = list_with_unread(&db, &ConversationFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.rows[0].conversation.id, busy.id);
        assert_eq!(page.rows[0].unread_count, 2);
        assert_eq!(page.rows[1].unread_count, 0);

        assert_eq!(unseen_count(&db, None).await.unwrap(), 2);
        assert_eq!(mark_seen(&db, busy.id, None).await.unwrap(), 2);
        assert_eq!(unseen_count(&db, Some(busy.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_filter_separates_test_conversations() {
        let db = test_db().await;
        create_or_update(&db, input("5550000003")).await.unwrap();
        create_or_update(
            &db,
            ConversationInput {
                test: Some(serde_json::json!({ "name": "Tester" })),
                ..input("5550000004")
            },
        )
        .await
        .unwrap();

        let only_tests = ConversationFilter {
            test: Some(true),
            query: None,
        };
        let page = list_with_unread(&db, &only_tests, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert!(page.rows[0].conversation.is_test());
    }
}
