use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::{context::resolve_admin_context, helpers::respond, validation::require},
    app_state::AppState,
    database::models::{package, service},
    errors::AppError,
    repositories::{
        packages,
        services::{self, ServiceInput},
    },
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDto {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub packages: Vec<i32>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopularDto {
    pub is_popular: bool,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: service::Model,
    pub packages: Vec<package::Model>,
}

async fn into_input(data: &AppState, dto: ServiceDto) -> Result<ServiceInput, AppError> {
    for package_id in &dto.packages {
        packages::find_by_id(&data.db, *package_id).await?;
    }
    Ok(ServiceInput {
        name: require(&dto.name, "name")?,
        description: dto.description,
        image: dto.image,
        is_popular: dto.is_popular,
        package_ids: dto.packages,
    })
}

#[utoipa::path(
    post,
    path = "/api/service",
    tag = "Services",
    request_body = ServiceDto,
    responses((status = 200, description = "Service created", body = service::Model))
)]
#[post("/service")]
pub async fn create_service(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<ServiceDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let input = into_input(&data, body.into_inner()).await?;
    let created = services::create(&data.db, input).await?;
    Ok(respond("Service created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/service",
    tag = "Services",
    request_body = ServiceDto,
    responses((status = 200, description = "Service updated, package links synced", body = service::Model))
)]
#[put("/service")]
pub async fn update_service(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<ServiceDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let id = dto.id.ok_or_else(|| AppError::invalid("Service ID is required!"))?;
    let input = into_input(&data, dto).await?;
    let updated = services::update(&data.db, id, input).await?;
    Ok(respond("Service updated successfully", updated))
}

#[utoipa::path(
    put,
    path = "/api/service/{id}/popular",
    tag = "Services",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = PopularDto,
    responses((status = 200, description = "Flag updated", body = service::Model))
)]
#[put("/service/{id}/popular")]
pub async fn set_popular(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<PopularDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let updated = services::set_popular(&data.db, path.into_inner(), body.is_popular).await?;
    Ok(respond("Service Package updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    responses((status = 200, description = "Services, popular first", body = [service::Model]))
)]
#[get("/services")]
pub async fn list_services(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let rows = services::list(&data.db).await?;
    Ok(respond("Services retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/service/{id}",
    tag = "Services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Service with its packages", body = ServiceView))
)]
#[get("/service/{id}")]
pub async fn get_service(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let service = services::find_by_id(&data.db, path.into_inner()).await?;
    let packages = services::packages_of(&data.db, service.id).await?;
    Ok(respond(
        "Service retrieved successfully",
        ServiceView { service, packages },
    ))
}

#[utoipa::path(
    delete,
    path = "/api/service/{id}",
    tag = "Services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Service deleted"))
)]
#[delete("/service/{id}")]
pub async fn delete_service(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    services::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Service deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_service)
        .service(update_service)
        .service(set_popular)
        .service(list_services)
        .service(get_service)
        .service(delete_service);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json, seed_fixtures};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn service_view_lists_linked_packages_and_popular_sorts_first() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let f = seed_fixtures(harness.db()).await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/service")
            .insert_header(("Authorization", token.clone()))
            .set_json(serde_json::json!({ "name": "Ceramic", "packages": [f.package.id] }))
            .to_request();
        let created = read_json(test::call_service(&app, req).await).await;
        let id = created["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/service/{}/popular", id))
            .insert_header(("Authorization", token))
            .set_json(serde_json::json!({ "isPopular": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri(&format!("/service/{}", id)).to_request();
        let view = read_json(test::call_service(&app, req).await).await;
        assert_eq!(view["data"]["packages"][0]["id"], f.package.id);

        let req = test::TestRequest::get().uri("/services").to_request();
        let list = read_json(test::call_service(&app, req).await).await;
        assert_eq!(list["data"][0]["name"], "Ceramic");
    }
}
