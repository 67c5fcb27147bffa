use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Build info for deploy checks. Not wrapped in the response envelope.
#[derive(Serialize, ToSchema, Clone)]
pub struct StatusResponse {
    pub ok: bool,
    pub ts: Option<String>,
    pub sha: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Status",
    responses((status = 200, description = "Service is up", body = StatusResponse))
)]
#[get("/status")]
pub async fn status(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        ok: true,
        ts: data.config.git_sha_ts.clone(),
        sha: data.config.git_sha.clone(),
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, read_json, test_config};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn reports_the_build() {
        let harness = TestHarness::with_config(crate::config::Config {
            git_sha: Some("abc123".into()),
            git_sha_ts: Some("1700000000".into()),
            ..test_config()
        })
        .await;
        let app =
            test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/status").to_request();
        let body = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["sha"], "abc123");
        assert_eq!(body["ts"], "1700000000");
    }
}
