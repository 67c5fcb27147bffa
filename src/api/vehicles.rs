use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    api::{
        context::resolve_auth_context,
        helpers::respond,
        validation::require,
    },
    app_state::AppState,
    database::{models::vehicle, types::Role},
    errors::AppError,
    repositories::{
        customers,
        vehicles::{self, VehicleInput},
    },
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
}

impl VehicleDto {
    pub fn into_input(self) -> Result<VehicleInput, AppError> {
        Ok(VehicleInput {
            r#type: require(&self.vehicle_type, "type")?,
            make: require(&self.make, "make")?,
            model: require(&self.model, "model")?,
            year: self.year,
            vin: self.vin,
            license_plate: self.license_plate,
            color: self.color,
        })
    }
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SaveVehicleDto {
    pub customer: i32,
    #[serde(flatten)]
    pub vehicle: VehicleDto,
}

#[utoipa::path(
    post,
    path = "/api/vehicle",
    tag = "Vehicles",
    request_body = SaveVehicleDto,
    responses((status = 200, description = "Vehicle saved; replaces the customer's previous one", body = vehicle::Model))
)]
#[post("/vehicle")]
pub async fn save_vehicle(
    data: web::Data<AppState>,
    body: web::Json<SaveVehicleDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    let customer = customers::find_by_id(&data.db, dto.customer).await?;
    let saved = vehicles::upsert_for_customer(&data.db, customer.id, dto.vehicle.into_input()?).await?;
    Ok(respond("Vehicle saved successfully", saved))
}

#[utoipa::path(
    get,
    path = "/api/vehicles/{customerId}",
    tag = "Vehicles",
    params(("customerId" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "Vehicles of the customer", body = [vehicle::Model]))
)]
#[get("/vehicles/{customer_id}")]
pub async fn list_vehicles(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let ctx = resolve_auth_context(&req, &data).await?;
    if ctx.role() == Role::Customer && ctx.account.id() != customer_id {
        return Err(AppError::Unauthorized("Not authorized!".to_string()));
    }
    let found = vehicles::list_for_customer(&data.db, customer_id).await?;
    Ok(respond("Success", found))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(save_vehicle).service(list_vehicles);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json, seed_customer};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn saving_twice_keeps_one_vehicle() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let customer = seed_customer(harness.db(), "owner@example.com").await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        for make in ["Honda", "Toyota"] {
            let req = test::TestRequest::post()
                .uri("/vehicle")
                .set_json(serde_json::json!({
                    "customer": customer.id,
                    "type": "Sedan",
                    "make": make,
                    "model": "Any",
                    "year": 2020,
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 200);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/vehicles/{}", customer.id))
            .insert_header(("Authorization", token))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["make"], "Toyota");
    }
}
