use sea_orm::ConnectionTrait;

use crate::{
    errors::AppError,
    repositories::{
        Paged,
        customer_services::{self, BookingDetails},
        employees,
    },
    services::booking::{BookingSubmission, Slot, VehicleChoice},
};

use super::structures::{CreateBookingDto, CreateCustomerServiceDto, VehicleRef};

pub fn booking_submission(dto: CreateBookingDto) -> Result<BookingSubmission, AppError> {
    if dto.total_price.trim().is_empty() {
        return Err(AppError::invalid("totalPrice is required"));
    }
    Ok(BookingSubmission {
        customer_id: dto.customer,
        service_id: dto.service,
        package_id: dto.package,
        total_price: Some(dto.total_price),
        vehicle: Some(VehicleChoice::Details(dto.vehicle.into_input()?)),
        slot: Some(Slot {
            date: dto.timeslot.date,
            timeslot_id: dto.timeslot.timeslot,
        }),
        add_ons: Some(dto.customer_add_ons),
    })
}

pub fn customer_service_submission(
    dto: CreateCustomerServiceDto,
) -> Result<BookingSubmission, AppError> {
    let vehicle = match dto.vehicle {
        Some(VehicleRef::Id(id)) => Some(VehicleChoice::Existing(id)),
        Some(VehicleRef::Details(details)) => Some(VehicleChoice::Details(details.into_input()?)),
        None => None,
    };
    Ok(BookingSubmission {
        customer_id: dto.customer,
        service_id: dto.service,
        package_id: dto.package,
        total_price: dto.total_price.filter(|p| !p.trim().is_empty()),
        vehicle,
        slot: dto.timeslot.map(|t| Slot {
            date: t.date,
            timeslot_id: t.timeslot,
        }),
        add_ons: dto.customer_add_ons,
    })
}

pub async fn expand_page<C: ConnectionTrait>(
    db: &C,
    paged: Paged<crate::database::models::customer_service::Model>,
) -> Result<Paged<BookingDetails>, AppError> {
    let mut rows = Vec::with_capacity(paged.rows.len());
    for booking in paged.rows {
        rows.push(customer_services::load_details(db, booking).await?);
    }
    Ok(Paged {
        rows,
        count: paged.count,
    })
}

pub async fn assign<C: ConnectionTrait>(
    db: &C,
    booking_id: i32,
    employee_id: i32,
) -> Result<(), AppError> {
    employees::find_by_id(db, employee_id).await?;
    customer_services::assign_employee(db, booking_id, employee_id).await?;
    log::info!("Employee {} assigned to booking {}", employee_id, booking_id);
    Ok(())
}
