use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Vehicles ---
pub mod vehicle {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "vehicles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub make: String,
        pub model: String,
        pub year: i32,
        pub r#type: String,
        pub vin: Option<String>,
        pub license_plate: Option<String>,
        pub color: Option<String>,
        /// One current vehicle per customer.
        #[sea_orm(unique)]
        pub customer_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    impl Model {
        pub fn describe(&self) -> String {
            format!("{} {} {}", self.year, self.make, self.model)
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::customer::Entity",
            from = "Column::CustomerId",
            to = "crate::database::models::customer::Column::Id"
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

// --- Schedules ---
pub mod schedule {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "schedules")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[schema(value_type = String, format = Date)]
        pub date: Date,
        pub timeslot_id: i32,
        pub customer_id: i32,
        pub employee_id: Option<i32>,
        pub status_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::timeslot::Entity",
            from = "Column::TimeslotId",
            to = "crate::database::models::timeslot::Column::Id"
        )]
        Timeslot,
        #[sea_orm(
            belongs_to = "crate::database::models::customer::Entity",
            from = "Column::CustomerId",
            to = "crate::database::models::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "crate::database::models::employee::Entity",
            from = "Column::EmployeeId",
            to = "crate::database::models::employee::Column::Id",
            on_delete = "SetNull"
        )]
        Employee,
    }

    impl Related<crate::database::models::timeslot::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Timeslot.def()
        }
    }

    impl Related<crate::database::models::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    stamp_timestamps!();
}

// --- Quotes ---
pub mod quote {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "quotes")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub quote_date: DateTimeUtc,
        pub quoted_amount: String,
        pub status_id: i32,
        pub customer_id: i32,
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
            to = "crate::database::models::customer::Column::Id"
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

// --- Customer services (bookings) ---
pub mod customer_service {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "customer_services")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub status_id: i32,
        pub customer_id: i32,
        pub service_id: i32,
        pub package_id: i32,
        pub vehicle_id: Option<i32>,
        #[sea_orm(unique)]
        pub schedule_id: Option<i32>,
        pub quote_id: Option<i32>,
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
            to = "crate::database::models::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "crate::database::models::service::Entity",
            from = "Column::ServiceId",
            to = "crate::database::models::service::Column::Id"
        )]
        Service,
        #[sea_orm(
            belongs_to = "crate::database::models::package::Entity",
            from = "Column::PackageId",
            to = "crate::database::models::package::Column::Id"
        )]
        Package,
        #[sea_orm(
            belongs_to = "super::vehicle::Entity",
            from = "Column::VehicleId",
            to = "super::vehicle::Column::Id",
            on_delete = "SetNull"
        )]
        Vehicle,
        #[sea_orm(
            belongs_to = "super::schedule::Entity",
            from = "Column::ScheduleId",
            to = "super::schedule::Column::Id",
            on_delete = "SetNull"
        )]
        Schedule,
        #[sea_orm(
            belongs_to = "super::quote::Entity",
            from = "Column::QuoteId",
            to = "super::quote::Column::Id",
            on_delete = "SetNull"
        )]
        Quote,
        #[sea_orm(has_many = "super::customer_add_on::Entity")]
        CustomerAddOn,
        #[sea_orm(has_many = "super::service_assignment::Entity")]
        ServiceAssignment,
    }

    impl Related<crate::database::models::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<crate::database::models::service::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Service.def()
        }
    }

    impl Related<crate::database::models::package::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Package.def()
        }
    }

    impl Related<super::customer_add_on::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CustomerAddOn.def()
        }
    }

    impl Related<super::service_assignment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ServiceAssignment.def()
        }
    }

    stamp_timestamps!();
}

// --- Customer add-ons ---
pub mod customer_add_on {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "customer_add_ons")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub quantity: i32,
        pub status_id: i32,
        pub customer_id: i32,
        pub customer_service_id: i32,
        pub add_on_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::customer::Entity",
            from = "Column::CustomerId",
            to = "crate::database::models::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::customer_service::Entity",
            from = "Column::CustomerServiceId",
            to = "super::customer_service::Column::Id",
            on_delete = "Cascade"
        )]
        CustomerService,
        #[sea_orm(
            belongs_to = "crate::database::models::add_on::Entity",
            from = "Column::AddOnId",
            to = "crate::database::models::add_on::Column::Id"
        )]
        AddOn,
    }

    impl Related<super::customer_service::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CustomerService.def()
        }
    }

    impl Related<crate::database::models::add_on::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AddOn.def()
        }
    }

    stamp_timestamps!(created_only);
}

// --- Service assignments ---
pub mod service_assignment {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[sea_orm(table_name = "service_assignments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub customer_service_id: i32,
        pub employee_id: i32,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer_service::Entity",
            from = "Column::CustomerServiceId",
            to = "super::customer_service::Column::Id",
            on_delete = "Cascade"
        )]
        CustomerService,
        #[sea_orm(
            belongs_to = "crate::database::models::employee::Entity",
            from = "Column::EmployeeId",
            to = "crate::database::models::employee::Column::Id"
        )]
        Employee,
    }

    impl Related<super::customer_service::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CustomerService.def()
        }
    }

    impl Related<crate::database::models::employee::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Employee.def()
        }
    }

    stamp_timestamps!();
}
