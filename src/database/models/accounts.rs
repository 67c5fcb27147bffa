use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Customers ---
pub mod customer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        /// Nullable so phone-only leads can exist.
        #[sea_orm(unique)]
        pub email: Option<String>,
        pub phone: Option<String>,
        #[serde(skip_serializing, default)]
        pub password: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
        pub status_id: i32,
        #[sea_orm(default_value = true)]
        pub allow_sms: bool,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub pass_reset_at: Option<DateTimeUtc>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub deleted_at: Option<DateTimeUtc>,
    }

    impl Model {
        pub fn full_name(&self) -> String {
            [self.first_name.as_deref(), self.last_name.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "crate::database::models::vehicle::Entity")]
        Vehicle,
        #[sea_orm(has_many = "crate::database::models::customer_service::Entity")]
        CustomerService,
        #[sea_orm(has_many = "crate::database::models::sms_conversation::Entity")]
        SmsConversation,
    }

    impl Related<crate::database::models::vehicle::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Vehicle.def()
        }
    }

    impl Related<crate::database::models::customer_service::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CustomerService.def()
        }
    }

    stamp_timestamps!();
}

// --- Employees ---
pub mod employee {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "employees")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub phone: Option<String>,
        #[serde(skip_serializing, default)]
        pub password: String,
        pub position: Option<String>,
        pub status_id: i32,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub pass_reset_at: Option<DateTimeUtc>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "crate::database::models::service_assignment::Entity")]
        ServiceAssignment,
    }

    impl Related<crate::database::models::service_assignment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ServiceAssignment.def()
        }
    }

    stamp_timestamps!();
}

// --- Admins ---
pub mod admin {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "admins")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing, default)]
        pub password: String,
        pub status_id: i32,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub pass_reset_at: Option<DateTimeUtc>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
        #[schema(value_type = Option<String>, format = DateTime)]
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    stamp_timestamps!();
}
