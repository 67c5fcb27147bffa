use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Services ---
pub mod service {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "services")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub image: Option<String>,
        pub is_popular: bool,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::service_package::Entity")]
        ServicePackage,
    }

    impl Related<super::service_package::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ServicePackage.def()
        }
    }

    stamp_timestamps!();
}

// --- Packages ---
pub mod package {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "packages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub display_name: String,
        pub description: String,
        pub price: String,
        pub image: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::package_add_on::Entity")]
        PackageAddOn,
    }

    impl Related<super::package_add_on::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::PackageAddOn.def()
        }
    }

    stamp_timestamps!();
}

// --- Add-on categories ---
pub mod add_on_category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "add_on_categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::add_on::Entity")]
        AddOn,
    }

    impl Related<super::add_on::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AddOn.def()
        }
    }

    stamp_timestamps!();
}

// --- Add-ons ---
pub mod add_on {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "add_ons")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub description: String,
        pub price: String,
        pub duration: i32,
        pub image: Option<String>,
        pub category_id: Option<i32>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::add_on_category::Entity",
            from = "Column::CategoryId",
            to = "super::add_on_category::Column::Id",
            on_delete = "SetNull"
        )]
        Category,
    }

    impl Related<super::add_on_category::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    stamp_timestamps!();
}

// --- Package <-> add-on join ---
pub mod package_add_on {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "package_add_ons")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub package_id: i32,
        pub add_on_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::package::Entity",
            from = "Column::PackageId",
            to = "super::package::Column::Id",
            on_delete = "Cascade"
        )]
        Package,
        #[sea_orm(
            belongs_to = "super::add_on::Entity",
            from = "Column::AddOnId",
            to = "super::add_on::Column::Id",
            on_delete = "Cascade"
        )]
        AddOn,
    }

    impl Related<super::package::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Package.def()
        }
    }

    impl Related<super::add_on::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AddOn.def()
        }
    }

    stamp_timestamps!();
}

// --- Service <-> package join ---
pub mod service_package {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "service_packages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub service_id: i32,
        pub package_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::service::Entity",
            from = "Column::ServiceId",
            to = "super::service::Column::Id",
            on_delete = "Cascade"
        )]
        Service,
        #[sea_orm(
            belongs_to = "super::package::Entity",
            from = "Column::PackageId",
            to = "super::package::Column::Id",
            on_delete = "Cascade"
        )]
        Package,
    }

    impl Related<super::service::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Service.def()
        }
    }

    impl Related<super::package::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Package.def()
        }
    }

    stamp_timestamps!();
}

// --- Timeslots ---
pub mod timeslot {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "timeslots")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        /// Display time, e.g. "09:00 AM".
        pub time: String,
        /// Comma separated weekday numbers, 0 = Sunday.
        pub days: String,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    impl Model {
        pub fn runs_on(&self, weekday: u32) -> bool {
            self.days
                .split(',')
                .filter_map(|day| day.trim().parse::<u32>().ok())
                .any(|day| day == weekday)
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "crate::database::models::schedule::Entity")]
        Schedule,
    }

    impl Related<crate::database::models::schedule::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Schedule.def()
        }
    }

    stamp_timestamps!();
}
