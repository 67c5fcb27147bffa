use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::{context::resolve_admin_context, helpers::respond, validation::require},
    app_state::AppState,
    database::models::{add_on, package},
    errors::AppError,
    repositories::{
        add_ons,
        packages::{self, PackageInput},
    },
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub id: Option<i32>,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    /// Ids of the add-ons offered with the package.
    #[serde(default)]
    pub add_ons: Vec<i32>,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    #[serde(flatten)]
    pub package: package::Model,
    pub add_ons: Vec<add_on::Model>,
}

async fn into_input(data: &AppState, dto: PackageDto) -> Result<PackageInput, AppError> {
    let found = add_ons::find_many(&data.db, &dto.add_ons).await?;
    if let Some(missing) = dto.add_ons.iter().find(|id| !found.iter().any(|a| a.id == **id)) {
        return Err(AppError::not_found(format!("AddOn {} not found!", missing)));
    }
    Ok(PackageInput {
        name: require(&dto.name, "name")?,
        display_name: require(&dto.display_name, "displayName")?,
        description: dto.description,
        price: require(&dto.price, "price")?,
        image: dto.image,
        add_on_ids: dto.add_ons,
    })
}

#[utoipa::path(
    post,
    path = "/api/package",
    tag = "Packages",
    request_body = PackageDto,
    responses((status = 200, description = "Package created", body = package::Model))
)]
#[post("/package")]
pub async fn create_package(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<PackageDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let input = into_input(&data, body.into_inner()).await?;
    let created = packages::create(&data.db, input).await?;
    Ok(respond("Package created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/package",
    tag = "Packages",
    request_body = PackageDto,
    responses((status = 200, description = "Package updated, add-on links synced", body = package::Model))
)]
#[put("/package")]
pub async fn update_package(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<PackageDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let id = dto.id.ok_or_else(|| AppError::invalid("Package ID is required!"))?;
    let input = into_input(&data, dto).await?;
    let updated = packages::update(&data.db, id, input).await?;
    Ok(respond("Package updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/packages",
    tag = "Packages",
    responses((status = 200, description = "Packages", body = [package::Model]))
)]
#[get("/packages")]
pub async fn list_packages(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let rows = packages::list(&data.db).await?;
    Ok(respond("Packages retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/package/{id}",
    tag = "Packages",
    params(("id" = i32, Path, description = "Package ID")),
    responses((status = 200, description = "Package with its add-ons", body = PackageView))
)]
#[get("/package/{id}")]
pub async fn get_package(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let package = packages::find_by_id(&data.db, path.into_inner()).await?;
    let add_ons = packages::add_ons_of(&data.db, package.id).await?;
    Ok(respond(
        "Package retrieved successfully",
        PackageView { package, add_ons },
    ))
}

#[utoipa::path(
    delete,
    path = "/api/package/{id}",
    tag = "Packages",
    params(("id" = i32, Path, description = "Package ID")),
    responses((status = 200, description = "Package deleted"))
)]
#[delete("/package/{id}")]
pub async fn delete_package(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    packages::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Package deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_package)
        .service(update_package)
        .service(list_packages)
        .service(get_package)
        .service(delete_package);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json, seed_add_on};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn update_replaces_the_add_on_links() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let wax = seed_add_on(harness.db(), "Wax").await;
        let shampoo = seed_add_on(harness.db(), "Shampoo").await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let body = |id: Option<i64>, add_ons: Vec<i32>| {
            serde_json::json!({
                "id": id,
                "name": "silver",
                "displayName": "Silver",
                "description": "Outside only",
                "price": "99",
                "addOns": add_ons,
            })
        };
        let req = test::TestRequest::post()
            .uri("/package")
            .insert_header(("Authorization", token.clone()))
            .set_json(body(None, vec![wax.id]))
            .to_request();
        let created = read_json(test::call_service(&app, req).await).await;
        let id = created["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri("/package")
            .insert_header(("Authorization", token))
            .set_json(body(Some(id), vec![shampoo.id]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri(&format!("/package/{}", id)).to_request();
        let view = read_json(test::call_service(&app, req).await).await;
        let names: Vec<_> = view["data"]["addOns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Shampoo".to_string()]);
    }
}
