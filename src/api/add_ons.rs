use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{context::resolve_admin_context, helpers::respond, validation::require},
    app_state::AppState,
    database::models::{add_on, add_on_category},
    errors::AppError,
    repositories::{
        add_on_categories,
        add_ons::{self, AddOnInput},
    },
};

// --- Categories ---

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddOnCategoryDto {
    pub id: Option<i32>,
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/addOnCategory",
    tag = "AddOns",
    request_body = AddOnCategoryDto,
    responses(
        (status = 200, description = "Category created", body = add_on_category::Model),
        (status = 400, description = "AddOn Category already exists!")
    )
)]
#[post("/addOnCategory")]
pub async fn create_category(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AddOnCategoryDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let name = require(&body.name, "name")?;
    let created = add_on_categories::create(&data.db, &name).await?;
    Ok(respond("AddOnCategory created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/addOnCategory",
    tag = "AddOns",
    request_body = AddOnCategoryDto,
    responses((status = 200, description = "Category updated", body = add_on_category::Model))
)]
#[put("/addOnCategory")]
pub async fn update_category(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AddOnCategoryDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let id = body
        .id
        .ok_or_else(|| AppError::invalid("AddOn Category ID is required!"))?;
    let name = require(&body.name, "name")?;
    let updated = add_on_categories::update(&data.db, id, &name).await?;
    Ok(respond("AddOnCategory updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/addOnCategory/list",
    tag = "AddOns",
    responses((status = 200, description = "Categories, most recently updated first", body = [add_on_category::Model]))
)]
#[get("/addOnCategory/list")]
pub async fn list_categories(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let rows = add_on_categories::list(&data.db).await?;
    Ok(respond("AddOnCategories retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/addOnCategory/{id}",
    tag = "AddOns",
    params(("id" = i32, Path, description = "Category ID")),
    responses((status = 200, description = "Category found", body = add_on_category::Model))
)]
#[get("/addOnCategory/{id}")]
pub async fn get_category(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let found = add_on_categories::find_by_id(&data.db, path.into_inner()).await?;
    Ok(respond("AddOnCategory retrieved successfully", found))
}

#[utoipa::path(
    delete,
    path = "/api/addOnCategory/{id}",
    tag = "AddOns",
    params(("id" = i32, Path, description = "Category ID")),
    responses((status = 200, description = "Category deleted"))
)]
#[delete("/addOnCategory/{id}")]
pub async fn delete_category(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    add_on_categories::delete(&data.db, path.into_inner()).await?;
    Ok(respond("AddOnCategory deleted successfully", serde_json::Value::Null))
}

// --- Add-ons ---

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddOnDto {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: i32,
    pub image: Option<String>,
    pub category: Option<i32>,
}

impl AddOnDto {
    fn into_input(self) -> Result<AddOnInput, AppError> {
        Ok(AddOnInput {
            name: require(&self.name, "name")?,
            description: self.description,
            price: require(&self.price, "price")?,
            duration: self.duration,
            image: self.image,
            category_id: self.category,
        })
    }
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AddOnListQuery {
    pub category_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/addOn",
    tag = "AddOns",
    request_body = AddOnDto,
    responses((status = 200, description = "Add-on created", body = add_on::Model))
)]
#[post("/addOn")]
pub async fn create_add_on(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AddOnDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let input = body.into_inner().into_input()?;
    if let Some(category_id) = input.category_id {
        add_on_categories::find_by_id(&data.db, category_id).await?;
    }
    let created = add_ons::create(&data.db, input).await?;
    Ok(respond("AddOn created successfully", created))
}

#[utoipa::path(
    put,
    path = "/api/addOn",
    tag = "AddOns",
    request_body = AddOnDto,
    responses((status = 200, description = "Add-on updated", body = add_on::Model))
)]
#[put("/addOn")]
pub async fn update_add_on(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AddOnDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let id = dto.id.ok_or_else(|| AppError::invalid("AddOn ID is required!"))?;
    let updated = add_ons::update(&data.db, id, dto.into_input()?).await?;
    Ok(respond("AddOn updated successfully", updated))
}

#[utoipa::path(
    get,
    path = "/api/addOns",
    tag = "AddOns",
    params(AddOnListQuery),
    responses((status = 200, description = "Add-ons", body = [add_on::Model]))
)]
#[get("/addOns")]
pub async fn list_add_ons(
    data: web::Data<AppState>,
    query: web::Query<AddOnListQuery>,
) -> Result<HttpResponse, AppError> {
    let rows = add_ons::list(&data.db, query.category_id).await?;
    Ok(respond("AddOns retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/addOn/{id}",
    tag = "AddOns",
    params(("id" = i32, Path, description = "Add-on ID")),
    responses((status = 200, description = "Add-on found", body = add_on::Model))
)]
#[get("/addOn/{id}")]
pub async fn get_add_on(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let found = add_ons::find_by_id(&data.db, path.into_inner()).await?;
    Ok(respond("AddOn retrieved successfully", found))
}

#[utoipa::path(
    delete,
    path = "/api/addOn/{id}",
    tag = "AddOns",
    params(("id" = i32, Path, description = "Add-on ID")),
    responses(
        (status = 200, description = "Add-on deleted"),
        (status = 400, description = "AddOn not found!")
    )
)]
#[delete("/addOn/{id}")]
pub async fn delete_add_on(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    add_ons::delete(&data.db, path.into_inner()).await?;
    Ok(respond("AddOn deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_category)
        .service(update_category)
        .service(list_categories)
        .service(get_category)
        .service(delete_category)
        .service(create_add_on)
        .service(update_add_on)
        .service(list_add_ons)
        .service(get_add_on)
        .service(delete_add_on);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn duplicate_category_name_is_rejected() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let create = || {
            test::TestRequest::post()
                .uri("/addOnCategory")
                .insert_header(("Authorization", token.clone()))
                .set_json(serde_json::json!({ "name": "Interior" }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, create()).await.status(), 200);
        let resp = test::call_service(&app, create()).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(read_json(resp).await["message"], "AddOn Category already exists!");

        let req = test::TestRequest::get()
            .uri("/addOnCategory/list")
            .insert_header(("Authorization", token))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn add_ons_filter_by_category_and_delete_reports_missing_rows() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let category = add_on_categories::create(harness.db(), "Exterior").await.unwrap();
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        for (name, category_id) in [("Wax", Some(category.id)), ("Vacuum", None)] {
            let req = test::TestRequest::post()
                .uri("/addOn")
                .insert_header(("Authorization", token.clone()))
                .set_json(serde_json::json!({
                    "name": name,
                    "description": "",
                    "price": "15",
                    "duration": 20,
                    "category": category_id,
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 200);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/addOns?categoryId={}", category.id))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Wax");

        let req = test::TestRequest::delete()
            .uri("/addOn/9999")
            .insert_header(("Authorization", token))
            .to_request();
        assert_eq!(read_json(test::call_service(&app, req).await).await["message"], "AddOn not found!");
    }
}
