use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Coupons ---
pub mod coupon {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "coupons")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub code: String,
        pub description: String,
        pub discount_amount: f64,
        pub discount_percentage: f64,
        #[schema(value_type = String, format = DateTime)]
        pub start_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub end_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::agent::Entity")]
        Agent,
    }

    impl Related<super::agent::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Agent.def()
        }
    }

    stamp_timestamps!();
}

// --- Agents ---
pub mod agent {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "agents")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        /// Channel the persona answers on, e.g. "SMS" or "EMAIL".
        pub r#type: String,
        #[sea_orm(column_type = "Text")]
        pub prompt: String,
        pub status_id: i32,
        #[sea_orm(column_type = "Text", nullable)]
        pub email_subject_format: Option<String>,
        pub coupon_id: Option<i32>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::coupon::Entity",
            from = "Column::CouponId",
            to = "super::coupon::Column::Id",
            on_delete = "SetNull"
        )]
        Coupon,
    }

    impl Related<super::coupon::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Coupon.def()
        }
    }

    stamp_timestamps!();
}

// --- SMS send records ---
pub mod sms_cron {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "sms_crons")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: Option<i32>,
        pub interval: Option<String>,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub date: Option<DateTimeUtc>,
        pub status_id: i32,
        pub clicked: bool,
        pub purchase: bool,
        pub failed: bool,
        pub stopped: bool,
        #[schema(value_type = Option<Object>)]
        pub details: Option<Json>,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub deleted_at: Option<DateTimeUtc>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::customer::Entity",
            from = "Column::CustomerId",
            to = "crate::database::models::customer::Column::Id",
            on_delete = "SetNull"
        )]
        Customer,
    }

    impl Related<crate::database::models::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    stamp_timestamps!();
}

// --- SMS conversations ---
pub mod sms_conversation {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "sms_conversations")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        /// Normalised phone number of the other party.
        pub contact: String,
        /// Our gateway number.
        pub did: String,
        #[sea_orm(column_type = "Text")]
        pub last_message: String,
        /// Present only for test conversations; carries `{name, vehicleName}` for the prompt.
        #[schema(value_type = Option<Object>)]
        pub test: Option<Json>,
        pub is_agent_active: bool,
        pub customer_id: Option<i32>,
        pub agent_id: Option<i32>,
        pub sms_cron_id: Option<i32>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    impl Model {
        pub fn is_test(&self) -> bool {
            self.test.as_ref().is_some_and(|value| !value.is_null())
        }

        pub fn test_field(&self, key: &str) -> Option<&str> {
            self.test
                .as_ref()
                .and_then(|value| value.get(key))
                .and_then(|value| value.as_str())
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::customer::Entity",
            from = "Column::CustomerId",
            to = "crate::database::models::customer::Column::Id",
            on_delete = "SetNull"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::agent::Entity",
            from = "Column::AgentId",
            to = "super::agent::Column::Id",
            on_delete = "SetNull"
        )]
        Agent,
        #[sea_orm(
            belongs_to = "super::sms_cron::Entity",
            from = "Column::SmsCronId",
            to = "super::sms_cron::Column::Id",
            on_delete = "SetNull"
        )]
        SmsCron,
        #[sea_orm(has_many = "super::sms_message::Entity")]
        SmsMessage,
    }

    impl Related<crate::database::models::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::agent::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Agent.def()
        }
    }

    impl Related<super::sms_message::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::SmsMessage.def()
        }
    }

    stamp_timestamps!();
}

// --- SMS messages ---
pub mod sms_message {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "sms_messages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub to: String,
        pub from: String,
        #[sea_orm(column_type = "Text")]
        pub message: String,
        pub seen: bool,
        pub conversation_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::sms_conversation::Entity",
            from = "Column::ConversationId",
            to = "super::sms_conversation::Column::Id",
            on_delete = "Cascade"
        )]
        Conversation,
    }

    impl Related<super::sms_conversation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Conversation.def()
        }
    }

    stamp_timestamps!(created_only);
}
