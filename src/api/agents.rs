use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{context::resolve_admin_context, helpers::respond, validation::require},
    app_state::AppState,
    database::models::agent,
    errors::AppError,
    repositories::{
        agents::{self, AgentInput},
        coupons,
    },
};

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub id: Option<i32>,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    pub prompt: String,
    pub status_id: Option<i32>,
    pub email_subject_format: Option<String>,
    /// Coupon advertised through the prompt placeholders.
    pub coupon: Option<i32>,
}

#[derive(Deserialize, IntoParams, Clone)]
#[into_params(parameter_in = Query)]
pub struct AgentListQuery {
    #[serde(rename = "type")]
    pub agent_type: Option<String>,
}

async fn into_input(data: &AppState, dto: AgentDto) -> Result<AgentInput, AppError> {
    if let Some(coupon_id) = dto.coupon {
        coupons::find_by_id(&data.db, coupon_id).await?;
    }
    Ok(AgentInput {
        name: require(&dto.name, "name")?,
        r#type: require(&dto.agent_type, "type")?,
        prompt: dto.prompt,
        status_id: dto.status_id,
        email_subject_format: dto.email_subject_format.filter(|f| !f.trim().is_empty()),
        coupon_id: dto.coupon,
    })
}

#[utoipa::path(
    post,
    path = "/api/agent",
    tag = "Agents",
    request_body = AgentDto,
    responses((status = 200, description = "Agent created or updated by (type, name)", body = agent::Model))
)]
#[post("/agent")]
pub async fn create_agent(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AgentDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let input = into_input(&data, body.into_inner()).await?;
    let saved = agents::create_or_update(&data.db, input).await?;
    Ok(respond("Agent created successfully!", saved))
}

#[utoipa::path(
    put,
    path = "/api/agent",
    tag = "Agents",
    request_body = AgentDto,
    responses((status = 200, description = "Agent updated", body = agent::Model))
)]
#[put("/agent")]
pub async fn update_agent(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AgentDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let id = dto.id.ok_or_else(|| AppError::invalid("Agent ID is required!"))?;
    let input = into_input(&data, dto).await?;
    let updated = agents::update(&data.db, id, input).await?;
    Ok(respond("Agent updated successfully!", updated))
}

#[utoipa::path(
    post,
    path = "/api/agent/{id}/duplicate",
    tag = "Agents",
    params(("id" = i32, Path, description = "Agent ID")),
    responses((status = 200, description = "Copy created", body = agent::Model))
)]
#[post("/agent/{id}/duplicate")]
pub async fn duplicate_agent(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let copy = agents::duplicate(&data.db, path.into_inner()).await?;
    Ok(respond("Agent duplicated successfully!", copy))
}

#[utoipa::path(
    get,
    path = "/api/agent/{type}/{name}",
    tag = "Agents",
    params(
        ("type" = String, Path, description = "Agent type, e.g. SMS"),
        ("name" = String, Path, description = "Agent name")
    ),
    responses((status = 200, description = "Agent or null", body = agent::Model))
)]
#[get("/agent/{agent_type}/{name}")]
pub async fn get_agent_by_type_and_name(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (agent_type, name) = path.into_inner();
    let found = agents::find_by_type_and_name(&data.db, &agent_type, &name).await?;
    Ok(respond("Agent fetched successfully!", found))
}

#[utoipa::path(
    get,
    path = "/api/agents",
    tag = "Agents",
    params(AgentListQuery),
    responses((status = 200, description = "Agents", body = [agent::Model]))
)]
#[get("/agents")]
pub async fn list_agents(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<AgentListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let rows = agents::list(&data.db, query.agent_type.as_deref()).await?;
    Ok(respond("Agent fetched successfully!", rows))
}

#[utoipa::path(
    delete,
    path = "/api/agent/{id}",
    tag = "Agents",
    params(("id" = i32, Path, description = "Agent ID")),
    responses((status = 200, description = "Agent deleted"))
)]
#[delete("/agent/{id}")]
pub async fn delete_agent(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    agents::delete(&data.db, path.into_inner()).await?;
    Ok(respond("Agent deleted successfully!", serde_json::Value::Null))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_agent)
        .service(update_agent)
        .service(duplicate_agent)
        .service(list_agents)
        .service(get_agent_by_type_and_name)
        .service(delete_agent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn posting_the_same_type_and_name_updates_in_place() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let app = test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let save = |prompt: &str| {
            test::TestRequest::post()
                .uri("/agent")
                .insert_header(("Authorization", token.clone()))
                .set_json(serde_json::json!({ "name": "Closer", "type": "SMS", "prompt": prompt }))
                .to_request()
        };
        let first = read_json(test::call_service(&app, save("v1")).await).await;
        let second = read_json(test::call_service(&app, save("v2")).await).await;
        assert_eq!(first["data"]["id"], second["data"]["id"]);

        let req = test::TestRequest::get().uri("/agent/SMS/Closer").to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["prompt"], "v2");

        let id = first["data"]["id"].as_i64().unwrap();
        let req = test::TestRequest::post()
            .uri(&format!("/agent/{}/duplicate", id))
            .insert_header(("Authorization", token))
            .to_request();
        let copy = read_json(test::call_service(&app, req).await).await;
        assert_eq!(copy["data"]["name"], "Closer - Copy");
        assert_eq!(copy["data"]["type"], "SMS");
    }
}
