//! Server-sent events for the admin inbox. A client joins one conversation room, or the global
//! room when `room` is omitted, and receives every event emitted there as it happens.

use actix_web::{HttpRequest, HttpResponse, get, web};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use utoipa::IntoParams;

use crate::{
    api::context::resolve_admin_context, app_state::AppState, errors::AppError,
    services::realtime::RealtimeEvent,
};

#[derive(Deserialize, IntoParams, Clone)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// Conversation id to join.
    pub room: Option<String>,
}

/// One SSE frame: the event name plus its JSON payload.
fn sse_frame(event: &RealtimeEvent) -> Option<web::Bytes> {
    match serde_json::to_string(&event.payload) {
        Ok(data) => Some(web::Bytes::from(format!(
            "event: {}\ndata: {}\n\n",
            event.event, data
        ))),
        Err(err) => {
            log::error!("Dropping unserializable {} event: {}", event.event, err);
            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/realtime/stream",
    tag = "Realtime",
    params(StreamQuery),
    responses((status = 200, description = "text/event-stream of sms, new-sms, seen-updated and seen-individual events"))
)]
#[get("/realtime/stream")]
pub async fn stream(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<StreamQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let receiver = data.hub.subscribe(query.room.as_deref());
    log::debug!(
        "Realtime subscriber joined {}",
        query.room.as_deref().unwrap_or("global")
    );

    let events = BroadcastStream::new(receiver).filter_map(|item| async move {
        match item {
            Ok(event) => sse_frame(&event).map(Ok::<_, actix_web::Error>),
            // lagged subscribers skip what they missed
            Err(err) => {
                log::warn!("Realtime subscriber lagged: {}", err);
                None
            }
        }
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(stream);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHarness;
    use actix_web::{App, test};
    use serde_json::json;

    #[actix_web::test]
    async fn frames_carry_the_event_name_and_payload() {
        let frame = sse_frame(&RealtimeEvent {
            room: "7".into(),
            event: "sms".into(),
            payload: json!({ "message": "hi" }),
        })
        .unwrap();
        assert_eq!(&frame[..], b"event: sms\ndata: {\"message\":\"hi\"}\n\n");
    }

    #[actix_web::test]
    async fn stream_requires_an_admin_and_answers_with_event_stream() {
        let harness = TestHarness::new().await;
        let token = harness.admin_token().await;
        let app =
            test::init_service(App::new().app_data(harness.data()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/realtime/stream?room=7").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let req = test::TestRequest::get()
            .uri("/realtime/stream?room=7")
            .insert_header(("Authorization", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
    }
}
