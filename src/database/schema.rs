//! Schema bootstrap: tables from entity definitions plus the unique keys
//! backing every natural-key upsert.

use sea_orm::sea_query::{Index, IndexCreateStatement, IntoIden};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

use crate::database::models::{
    add_on, add_on_category, admin, agent, coupon, customer, customer_add_on, customer_service,
    employee, package, package_add_on, quote, schedule, service, service_assignment,
    service_package, sms_conversation, sms_cron, sms_message, timeslot, vehicle,
};

async fn create_table<C, E>(
    db: &C,
    schema: &Schema,
    entity: E,
    mut unique_keys: Vec<IndexCreateStatement>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    for key in unique_keys.iter_mut() {
        stmt.index(key);
    }
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Inline composite unique key, for keys a single-column `unique` attribute cannot express.
fn unique_key<C: IntoIden + Copy>(name: &str, columns: &[C]) -> IndexCreateStatement {
    let mut index = Index::create();
    index.name(name).unique();
    for column in columns {
        index.col(*column);
    }
    index
}

/// Creates every table, parents first, with its unique keys. Idempotent.
pub async fn sync<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, customer::Entity, vec![]).await?;
    create_table(db, &schema, employee::Entity, vec![]).await?;
    create_table(db, &schema, admin::Entity, vec![]).await?;
    create_table(db, &schema, service::Entity, vec![]).await?;
    create_table(db, &schema, package::Entity, vec![]).await?;
    create_table(db, &schema, add_on_category::Entity, vec![]).await?;
    create_table(db, &schema, add_on::Entity, vec![]).await?;
    create_table(
        db,
        &schema,
        package_add_on::Entity,
        vec![unique_key(
            "uq_package_add_ons_package_add_on",
            &[package_add_on::Column::PackageId, package_add_on::Column::AddOnId],
        )],
    )
    .await?;
    create_table(
        db,
        &schema,
        service_package::Entity,
        vec![unique_key(
            "uq_service_packages_service_package",
            &[service_package::Column::ServiceId, service_package::Column::PackageId],
        )],
    )
    .await?;
    create_table(
        db,
        &schema,
        timeslot::Entity,
        vec![unique_key(
            "uq_timeslots_time_days",
            &[timeslot::Column::Time, timeslot::Column::Days],
        )],
    )
    .await?;
    create_table(db, &schema, vehicle::Entity, vec![]).await?;
    create_table(
        db,
        &schema,
        schedule::Entity,
        vec![unique_key(
            "uq_schedules_customer_date_timeslot",
            &[
                schedule::Column::CustomerId,
                schedule::Column::Date,
                schedule::Column::TimeslotId,
            ],
        )],
    )
    .await?;
    create_table(db, &schema, quote::Entity, vec![]).await?;
    create_table(
        db,
        &schema,
        customer_service::Entity,
        vec![unique_key(
            "uq_customer_services_customer_service_package",
            &[
                customer_service::Column::CustomerId,
                customer_service::Column::ServiceId,
                customer_service::Column::PackageId,
            ],
        )],
    )
    .await?;
    create_table(db, &schema, customer_add_on::Entity, vec![]).await?;
    create_table(db, &schema, service_assignment::Entity, vec![]).await?;
    create_table(db, &schema, coupon::Entity, vec![]).await?;
    create_table(
        db,
        &schema,
        agent::Entity,
        vec![unique_key(
            "uq_agents_type_name",
            &[agent::Column::Type, agent::Column::Name],
        )],
    )
    .await?;
    create_table(db, &schema, sms_cron::Entity, vec![]).await?;
    create_table(
        db,
        &schema,
        sms_conversation::Entity,
        vec![unique_key(
            "uq_sms_conversations_contact_did",
            &[sms_conversation::Column::Contact, sms_conversation::Column::Did],
        )],
    )
    .await?;
    create_table(db, &schema, sms_message::Entity, vec![]).await?;

    log::info!("Database schema is in sync");
    Ok(())
}
