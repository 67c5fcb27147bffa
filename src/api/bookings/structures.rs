use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::vehicles::VehicleDto;

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotChoice {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub timeslot: i32,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingDto {
    pub total_price: String,
    pub vehicle: VehicleDto,
    pub service: i32,
    pub package: i32,
    pub timeslot: TimeslotChoice,
    pub customer: i32,
    /// Add-on id to quantity.
    #[schema(value_type = Object)]
    pub customer_add_ons: BTreeMap<i32, i32>,
}

/// Either the id of the customer's saved vehicle or a full description.
#[derive(Deserialize, ToSchema, Clone)]
#[serde(untagged)]
pub enum VehicleRef {
    Id(i32),
    Details(VehicleDto),
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerServiceDto {
    pub customer: i32,
    pub service: i32,
    pub package: i32,
    pub vehicle: Option<VehicleRef>,
    pub timeslot: Option<TimeslotChoice>,
    pub total_price: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub customer_add_ons: Option<BTreeMap<i32, i32>>,
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    pub query_string: Option<String>,
    pub current: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusDto {
    pub status_id: i32,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssignEmployeeDto {
    pub employee: i32,
}
