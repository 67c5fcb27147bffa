//! Booking workflow: every write of a submission runs in one transaction.

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::{
    config::Config,
    database::models::customer_service,
    errors::AppError,
    repositories::{
        customer_services::{self, BookingDetails, BookingKey, BookingLinks},
        customers, packages, quotes, schedules, services, timeslots,
        vehicles::{self, VehicleInput},
    },
    services::{mailer::Mailer, notifications},
};

/// A booking either describes the vehicle or points at the customer's saved one.
#[derive(Debug, Clone)]
pub enum VehicleChoice {
    Existing(i32),
    Details(VehicleInput),
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub date: NaiveDate,
    pub timeslot_id: i32,
}

/// A full booking carries every optional part; a partial customer-service submission may
/// carry none of them.
#[derive(Debug, Clone)]
pub struct BookingSubmission {
    pub customer_id: i32,
    pub service_id: i32,
    pub package_id: i32,
    pub total_price: Option<String>,
    pub vehicle: Option<VehicleChoice>,
    pub slot: Option<Slot>,
    pub add_ons: Option<BTreeMap<i32, i32>>,
}

/// Writes the submission and returns the booking row as written plus its expanded view.
pub async fn submit(
    db: &DatabaseConnection,
    submission: BookingSubmission,
) -> Result<(customer_service::Model, BookingDetails), AppError> {
    let txn = db.begin().await?;

    let customer = customers::find_by_id(&txn, submission.customer_id).await?;
    services::find_by_id(&txn, submission.service_id).await?;
    packages::find_by_id(&txn, submission.package_id).await?;

    let vehicle = match submission.vehicle {
        Some(VehicleChoice::Details(input)) => {
            Some(vehicles::upsert_for_customer(&txn, customer.id, input).await?)
        }
        Some(VehicleChoice::Existing(id)) => Some(
            vehicles::find_by_customer(&txn, customer.id)
                .await?
                .filter(|v| v.id == id)
                .ok_or_else(|| AppError::not_found("Vehicle not found!"))?,
        ),
        None => None,
    };

    let schedule = match &submission.slot {
        Some(slot) => {
            timeslots::find_by_id(&txn, slot.timeslot_id).await?;
            Some(schedules::upsert(&txn, customer.id, slot.date, slot.timeslot_id).await?)
        }
        None => None,
    };

    let quote = match submission.total_price.as_deref() {
        Some(price) => Some(quotes::create(&txn, customer.id, price).await?),
        None => None,
    };

    let booking = customer_services::upsert(
        &txn,
        BookingKey {
            customer_id: customer.id,
            service_id: submission.service_id,
            package_id: submission.package_id,
        },
        BookingLinks {
            vehicle_id: vehicle.map(|v| v.id),
            schedule_id: schedule.map(|s| s.id),
            quote_id: quote.map(|q| q.id),
        },
    )
    .await?;

    if let Some(add_ons) = submission.add_ons.as_ref() {
        customer_services::replace_add_ons(&txn, &booking, add_ons).await?;
    }

    txn.commit().await?;

    let details = customer_services::load_details(db, booking.clone()).await?;
    Ok((booking, details))
}

/// Sends the booking summary to the business inbox on a background task. Failures are logged.
pub fn notify_business(
    mailer: Arc<dyn Mailer>,
    config: &Config,
    details: &BookingDetails,
    total_price: &str,
) {
    let Some(inbox) = config.smtp_email.clone() else {
        log::warn!("SMTP_EMAIL not set, skipping booking email for {}", details.booking.id);
        return;
    };
    let email = notifications::booking_created(&config.company_name, details, total_price);
    let booking_id = details.booking.id;
    tokio::spawn(async move {
        match mailer.send_html(&inbox, &email.subject, email.html).await {
            Ok(()) => log::info!("Booking email sent for {}", booking_id),
            Err(err) => log::error!("Problem sending booking email for {}: {}", booking_id, err),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::models::{customer_add_on, customer_service, quote, schedule, vehicle},
        test_support::{seed_fixtures, test_db},
    };
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

    fn vehicle_input(make: &str) -> VehicleInput {
        VehicleInput {
            r#type: "Sedan".into(),
            make: make.into(),
            model: "Civic".into(),
            year: 2019,
            vin: None,
            license_plate: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn full_booking_rolls_back_when_an_add_on_is_unknown() {
        let db = test_db().await;
        let f = seed_fixtures(&db).await;

        let err = submit(
            &db,
            BookingSubmission {
                customer_id: f.customer.id,
                service_id: f.service.id,
                package_id: f.package.id,
                total_price: Some("150".into()),
                vehicle: Some(VehicleChoice::Details(vehicle_input("Honda"))),
                slot: Some(Slot {
                    date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                    timeslot_id: f.timeslot.id,
                }),
                add_ons: Some(BTreeMap::from([(9999, 1)])),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not found"));

        assert_eq!(vehicle::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(schedule::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(quote::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(customer_service::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn partial_submission_writes_only_the_booking() {
        let db = test_db().await;
        let f = seed_fixtures(&db).await;

        let (booking, details) = submit(
            &db,
            BookingSubmission {
                customer_id: f.customer.id,
                service_id: f.service.id,
                package_id: f.package.id,
                total_price: None,
                vehicle: None,
                slot: None,
                add_ons: None,
            },
        )
        .await
        .unwrap();

        assert!(booking.vehicle_id.is_none());
        assert!(details.schedule.is_none());
        assert_eq!(
            customer_add_on::Entity::find()
                .filter(customer_add_on::Column::CustomerServiceId.eq(booking.id))
                .count(&db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_customer_fails_before_any_write() {
        let db = test_db().await;
        let f = seed_fixtures(&db).await;

        let err = submit(
            &db,
            BookingSubmission {
                customer_id: f.customer.id + 100,
                service_id: f.service.id,
                package_id: f.package.id,
                total_price: Some("10".into()),
                vehicle: Some(VehicleChoice::Details(vehicle_input("Kia"))),
                slot: None,
                add_ons: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Customer not found!");
        assert_eq!(vehicle::Entity::find().count(&db).await.unwrap(), 0);
    }
}
