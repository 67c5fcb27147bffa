//! HTML bodies for outgoing email.

use crate::{
    repositories::customer_services::BookingDetails,
    services::formatting::{escape_html, title_case},
};

pub struct Email {
    pub subject: String,
    pub html: String,
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding:4px 12px;font-weight:bold\">{}</td><td style=\"padding:4px 12px\">{}</td></tr>",
        label,
        escape_html(value)
    )
}

/// Booking summary sent to the business inbox.
pub fn booking_created(company_name: &str, details: &BookingDetails, total_price: &str) -> Email {
    let customer = details.customer.as_ref();
    let name = customer.map(|c| title_case(&c.full_name())).unwrap_or_default();
    let field = |value: Option<&String>| value.cloned().unwrap_or_default();
    let schedule = details
        .schedule
        .as_ref()
        .map(|s| {
            let time = s.timeslot.as_ref().map(|t| t.time.as_str()).unwrap_or_default();
            format!("{} {}", s.schedule.date, time)
        })
        .unwrap_or_default();
    let add_ons = details
        .customer_add_ons
        .iter()
        .map(|row| {
            format!(
                "<li>{} &times; {}</li>",
                escape_html(&row.add_on.name),
                row.quantity
            )
        })
        .collect::<Vec<_>>()
        .join("");

    let rows = [
        row("Name", &name),
        row("Email", &field(customer.and_then(|c| c.email.as_ref()))),
        row("Phone", &field(customer.and_then(|c| c.phone.as_ref()))),
        row("Address", &field(customer.and_then(|c| c.address.as_ref()))),
        row(
            "Service",
            details.service.as_ref().map(|s| s.name.as_str()).unwrap_or_default(),
        ),
        row(
            "Package",
            details.package.as_ref().map(|p| p.name.as_str()).unwrap_or_default(),
        ),
        row("Schedule", &schedule),
        row("Price", total_price),
        row(
            "Vehicle",
            &details.vehicle.as_ref().map(|v| v.describe()).unwrap_or_default(),
        ),
    ]
    .join("");

    let html = format!(
        "<html><body><h2>New booking</h2><table>{}</table><h3>Add-ons</h3><ul>{}</ul></body></html>",
        rows, add_ons
    );

    Email {
        subject: format!("{} | Booking Created", company_name),
        html,
    }
}

pub fn password_reset(company_name: &str, first_name: &str, reset_url: &str) -> Email {
    let html = format!(
        "<html><body><p>Hi {},</p><p>Use the link below to reset your password. It expires in 5 minutes.</p><p><a href=\"{}\">Reset password</a></p><p>{}</p></body></html>",
        escape_html(&title_case(first_name)),
        escape_html(reset_url),
        escape_html(company_name)
    );
    Email {
        subject: "Reset password".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_fixtures, test_db};
    use crate::repositories::{
        customer_services::{self, BookingKey, BookingLinks},
        schedules, vehicles,
    };
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn booking_email_lists_every_field() {
        let db = test_db().await;
        let f = seed_fixtures(&db).await;
        let vehicle = vehicles::upsert_for_customer(
            &db,
            f.customer.id,
            vehicles::VehicleInput {
                r#type: "SUV".into(),
                make: "Honda".into(),
                model: "Pilot".into(),
                year: 2020,
                vin: None,
                license_plate: None,
                color: None,
            },
        )
        .await
        .unwrap();
        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let schedule = schedules::upsert(&db, f.customer.id, date, f.timeslot.id).await.unwrap();
        let booking = customer_services::upsert(
            &db,
            BookingKey {
                customer_id: f.customer.id,
                service_id: f.service.id,
                package_id: f.package.id,
            },
            BookingLinks {
                vehicle_id: Some(vehicle.id),
                schedule_id: Some(schedule.id),
                quote_id: None,
            },
        )
        .await
        .unwrap();
        customer_services::replace_add_ons(&db, &booking, &BTreeMap::from([(f.add_on.id, 2)]))
            .await
            .unwrap();
        let details = customer_services::load_details(&db, booking).await.unwrap();

        let email = booking_created("BU Mobile Detailing", &details, "$199");
        assert_eq!(email.subject, "BU Mobile Detailing | Booking Created");
        assert!(email.html.contains("Jane Doe"));
        assert!(email.html.contains("2025-03-04 09:00 AM"));
        assert!(email.html.contains("Pet hair removal &times; 2"));
        assert!(email.html.contains("2020 Honda Pilot"));
    }

    #[test]
    fn reset_email_escapes_link() {
        let email = password_reset("Acme", "sam", "http://x/reset?token=a&b");
        assert!(email.html.contains("Hi Sam"));
        assert!(email.html.contains("token=a&amp;b"));
    }
}
