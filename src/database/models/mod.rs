//! Entity definitions. Each entity is plain data; persistence lives in `crate::repositories`.

/// Stamps `created_at` on insert and `updated_at` on every save.
macro_rules! stamp_timestamps {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                let now = chrono::Utc::now();
                if insert {
                    self.created_at = sea_orm::ActiveValue::Set(now);
                }
                self.updated_at = sea_orm::ActiveValue::Set(now);
                Ok(self)
            }
        }
    };
    (created_only) => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                if insert {
                    self.created_at = sea_orm::ActiveValue::Set(chrono::Utc::now());
                }
                Ok(self)
            }
        }
    };
}

pub mod accounts;
pub mod booking;
pub mod catalog;
pub mod messaging;

pub use accounts::{admin, customer, employee};
pub use booking::{customer_add_on, customer_service, quote, schedule, service_assignment, vehicle};
pub use catalog::{add_on, add_on_category, package, package_add_on, service, service_package, timeslot};
pub use messaging::{agent, coupon, sms_conversation, sms_cron, sms_message};
