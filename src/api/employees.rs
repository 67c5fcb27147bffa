use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        context::resolve_admin_context,
        helpers::{PageResponse, respond},
        validation::{require, validate_email, validate_password},
    },
    app_state::AppState,
    database::models::employee,
    errors::AppError,
    repositories::{
        PageRequest,
        employees::{self, EmployeePatch, NewEmployee},
    },
    services::auth::hash_password,
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub position: Option<String>,
}

#[derive(Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub position: Option<String>,
    pub status_id: Option<i32>,
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    pub query_string: Option<String>,
    pub current: Option<u64>,
    pub page_size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/employee",
    tag = "Employees",
    request_body = CreateEmployeeDto,
    responses(
        (status = 200, description = "Employee created", body = employee::Model),
        (status = 400, description = "Employee already exists")
    )
)]
#[post("/employee")]
pub async fn create_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateEmployeeDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let email = validate_email(&dto.email)?;
    validate_password(&dto.password)?;

    let created = employees::create(
        &data.db,
        NewEmployee {
            first_name: require(&dto.first_name, "firstName")?,
            last_name: require(&dto.last_name, "lastName")?,
            email,
            phone: dto.phone,
            password: hash_password(&dto.password, data.config.hash_salt_rounds)?,
            position: dto.position,
        },
    )
    .await?;
    log::info!("Employee {} created", created.id);
    Ok(respond("Employee created successfully", created))
}

#[utoipa::path(
    get,
    path = "/api/employee/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee ID")),
    responses((status = 200, description = "Employee found", body = employee::Model))
)]
#[get("/employee/{id}")]
pub async fn get_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let found = employees::find_by_id(&data.db, path.into_inner()).await?;
    Ok(respond("Success", found))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    params(EmployeeListQuery),
    responses((status = 200, description = "Paged employees"))
)]
#[get("/employees")]
pub async fn list_employees(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let page = PageRequest {
        current: query.current,
        page_size: query.page_size,
    };
    let paged = employees::list(&data.db, query.query_string.as_deref(), page).await?;
    Ok(respond("Success", PageResponse::new(paged, &page)))
}

#[utoipa::path(
    put,
    path = "/api/employee/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee ID")),
    request_body = UpdateEmployeeDto,
    responses((status = 200, description = "Employee updated", body = employee::Model))
)]
#[put("/employee/{id}")]
pub async fn update_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateEmployeeDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let email = dto.email.as_deref().map(validate_email).transpose()?;
    let password = match dto.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password, data.config.hash_salt_rounds)?)
        }
        None => None,
    };

    let updated = employees::update(
        &data.db,
        path.into_inner(),
        EmployeePatch {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email,
            phone: dto.phone,
            password,
            position: dto.position,
            status_id: dto.status_id,
        },
    )
    .await?;
    Ok(respond("Employee updated successfully", updated))
}

#[utoipa::path(
    delete,
    path = "/api/employee/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee ID")),
    responses((status = 200, description = "Employee deleted"))
)]
#[delete("/employee/{id}")]
pub async fn delete_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    employees::soft_delete(&data.db, path.into_inner()).await?;
    Ok(respond("Employee deleted successfully", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_employee)
        .service(list_employees)
        .service(get_employee)
        .service(update_employee)
        .service(delete_employee);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn duplicate_employee_email_is_rejected() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let create = || {
            test::TestRequest::post()
                .uri("/employee")
                .insert_header(("Authorization", token.clone()))
                .set_json(serde_json::json!({
                    "firstName": "Mike",
                    "lastName": "Ross",
                    "email": "mike@example.com",
                    "password": "detail-pass",
                }))
                .to_request()
        };
        let first = read_json(test::call_service(&app, create()).await).await;
        assert_eq!(first["message"], "Employee created successfully");
        assert!(first["data"].get("password").is_none());

        let resp = test::call_service(&app, create()).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(read_json(resp).await["message"], "Employee already exists");
    }

    #[actix_web::test]
    async fn deleted_employees_drop_out_of_the_list() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let employee = crate::test_support::seed_fixtures(harness.db()).await.employee;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/employee/{}", employee.id))
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/employees")
            .insert_header(("Authorization", token))
            .to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["count"], 0);
    }
}
