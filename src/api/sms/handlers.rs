use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use serde_json::json;

use crate::{
    api::{
        context::resolve_admin_context,
        helpers::{PageResponse, respond},
        validation::{require, validate_phone},
    },
    app_state::AppState,
    database::models::{sms_conversation, sms_message},
    errors::AppError,
    repositories::{
        PageRequest, agents,
        conversations::{self, ConversationFilter, ConversationInput, ConversationPatch},
        customers,
    },
    services::{
        llm::ChatMessage,
        prompt::{PromptContext, system_prompt},
        realtime::events,
        sms_agent::{self, InboundSms},
    },
};

use super::functions::{conversation_view, emit_seen, generation_messages, import_history};
use super::structures::{
    AgentActivationDto, ConversationListQuery, ConversationLookup, ConversationView,
    CreateConversationDto, CreateTestConversationDto, GenerateSmsDto, MarkSeenDto, SendSmsDto,
    SentSms, SmsCallbackEcho, SmsCallbackQuery, UnseenCount, UpdateConversationDto,
};

#[utoipa::path(
    get,
    path = "/api/sms/callback",
    tag = "SMS",
    params(SmsCallbackQuery),
    responses(
        (status = 200, description = "Message stored; the agent reply is scheduled", body = SmsCallbackEcho),
        (status = 400, description = "Unknown conversation, or no active agent to reply")
    )
)]
#[get("/sms/callback")]
pub async fn sms_callback(
    data: web::Data<AppState>,
    query: web::Query<SmsCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    log::info!("Inbound SMS from {} to {}", query.from, query.to);
    // the reply task outlives the request
    let _reply = sms_agent::receive(
        &data,
        InboundSms {
            to: query.to.clone(),
            from: query.from.clone(),
            message: query.message.clone(),
        },
    )
    .await?;
    Ok(respond("SMS received successfully!", SmsCallbackEcho::from(query)))
}

#[utoipa::path(
    post,
    path = "/api/sms",
    tag = "SMS",
    request_body = SendSmsDto,
    responses((status = 200, description = "Message stored and sent", body = SentSms))
)]
#[post("/sms")]
pub async fn send_sms(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<SendSmsDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let dst = validate_phone(&dto.dst)?;
    let message = require(&dto.message, "message")?;
    let did = data.config.sms_did.clone();

    let mut stored: Option<sms_message::Model> = None;
    if let Some(conversation_id) = dto.conversation_id {
        let conversation = conversations::find_by_id(&data.db, conversation_id).await?;
        let msg =
            conversations::add_message(&data.db, conversation.id, &dst, &did, &message, true)
                .await?;
        conversations::set_last_message(&data.db, conversation, &message).await?;
        data.realtime.emit(
            Some(&conversation_id.to_string()),
            events::SMS,
            json!({
                "conversationId": conversation_id,
                "id": msg.id,
                "to": msg.to,
                "from": msg.from,
                "message": msg.message,
            }),
        );
        stored = Some(msg);
    }

    let delivered = sms_agent::deliver(&data, &dst, &message, dto.test).await?;
    Ok(respond(
        "SMS sent successfully!",
        SentSms {
            id: stored.map(|m| m.id),
            to: dst,
            from: did,
            message,
            delivered,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/sms/generate",
    tag = "SMS",
    request_body = GenerateSmsDto,
    responses((status = 200, description = "Generated text", body = String))
)]
#[post("/sms/generate")]
pub async fn generate_sms(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<GenerateSmsDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let (agent, coupon) = agents::find_with_coupon(&data.db, dto.agent_id).await?;
    let name = match dto.customer_id {
        Some(id) => customers::find_by_id(&data.db, id)
            .await?
            .first_name
            .unwrap_or_default(),
        None => String::new(),
    };
    let messages = generation_messages(
        &data,
        &agent,
        coupon.as_ref(),
        &name,
        dto.generated_message.as_deref(),
        dto.with_subject,
    );
    let text = data.llm.complete(&messages).await?;
    Ok(respond("SMS generated successfully!", text))
}

#[utoipa::path(
    get,
    path = "/api/conversation",
    tag = "SMSConversation",
    params(ConversationLookup),
    responses(
        (status = 200, description = "Conversation with its messages", body = ConversationView),
        (status = 400, description = "Conversation not found!")
    )
)]
#[get("/conversation")]
pub async fn find_conversation(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<ConversationLookup>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let did = data.config.sms_did.clone();

    let conversation = match (&query.contact, query.id) {
        (Some(contact), _) => {
            let contact = validate_phone(contact)?;
            let local = conversations::find_by_phone(&data.db, &contact, &did).await?;
            let has_messages = match &local {
                Some(found) => !conversations::messages(&data.db, found.id).await?.is_empty(),
                None => false,
            };
            match local {
                Some(found) if has_messages => found,
                _ => import_history(&data, &contact)
                    .await?
                    .ok_or_else(|| AppError::not_found("Conversation not found!"))?,
            }
        }
        (None, Some(id)) => conversations::find_by_id(&data.db, id).await?,
        (None, None) => return Err(AppError::invalid("id or contact is required")),
    };

    let view = conversation_view(&data, conversation).await?;
    Ok(respond("Conversation Retrieved", view))
}

#[utoipa::path(
    post,
    path = "/api/conversation",
    tag = "SMSConversation",
    request_body = CreateConversationDto,
    responses((status = 200, description = "Created or updated by contact", body = sms_conversation::Model))
)]
#[post("/conversation")]
pub async fn create_conversation(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateConversationDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    if let Some(customer_id) = dto.customer {
        customers::find_by_id(&data.db, customer_id).await?;
    }
    if let Some(agent_id) = dto.agent {
        agents::find_by_id(&data.db, agent_id).await?;
    }
    let saved = conversations::create_or_update(
        &data.db,
        ConversationInput {
            contact: validate_phone(&dto.contact)?,
            did: data.config.sms_did.clone(),
            last_message: dto.last_message,
            customer_id: dto.customer,
            agent_id: dto.agent,
            ..Default::default()
        },
    )
    .await?;
    Ok(respond("SMS Conversation created successfully!", saved))
}

#[utoipa::path(
    post,
    path = "/api/conversation/test",
    tag = "SMSConversation",
    request_body = CreateTestConversationDto,
    responses((status = 200, description = "Test conversation with the agent's opening message", body = sms_conversation::Model))
)]
#[post("/conversation/test")]
pub async fn create_test_conversation(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateTestConversationDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    let contact = validate_phone(&dto.contact)?;
    let name = require(&dto.name, "name")?;
    let vehicle_name = require(&dto.vehicle_name, "vehicleName")?;
    let (agent, coupon) = agents::find_with_coupon(&data.db, dto.agent_id).await?;

    let ctx = PromptContext::from_config(&data.config);
    let prompt = system_prompt(&agent.prompt, coupon.as_ref(), &name, Some(&vehicle_name), &ctx);
    let opening = data
        .llm
        .complete(&[ChatMessage::system(prompt)])
        .await?;

    let did = data.config.sms_did.clone();
    let conversation = conversations::create_or_update(
        &data.db,
        ConversationInput {
            contact: contact.clone(),
            did: did.clone(),
            last_message: Some(opening.clone()),
            test: Some(json!({ "name": name, "vehicleName": vehicle_name })),
            is_agent_active: Some(true),
            agent_id: Some(agent.id),
            ..Default::default()
        },
    )
    .await?;
    conversations::add_message(&data.db, conversation.id, &contact, &did, &opening, true).await?;
    Ok(respond("Test SMS Conversation created successfully!", conversation))
}

#[utoipa::path(
    put,
    path = "/api/conversation",
    tag = "SMSConversation",
    request_body = UpdateConversationDto,
    responses((status = 200, description = "Conversation updated", body = sms_conversation::Model))
)]
#[put("/conversation")]
pub async fn update_conversation(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<UpdateConversationDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let dto = body.into_inner();
    if let Some(agent_id) = dto.agent {
        agents::find_by_id(&data.db, agent_id).await?;
    }
    let updated = conversations::update(
        &data.db,
        dto.id,
        ConversationPatch {
            last_message: dto.last_message,
            is_agent_active: dto.is_agent_active,
            customer_id: dto.customer,
            agent_id: dto.agent,
            test: None,
        },
    )
    .await?;
    Ok(respond("SMS Conversation updated successfully!", updated))
}

#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "SMSConversation",
    params(ConversationListQuery),
    responses((status = 200, description = "Paged conversations, most unread first"))
)]
#[get("/conversations")]
pub async fn list_conversations(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<ConversationListQuery>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let page = PageRequest {
        current: query.current,
        page_size: query.page_size,
    };
    let filter = ConversationFilter {
        test: Some(query.test),
        query: query.query_string.clone(),
    };
    let paged = conversations::list_with_unread(&data.db, &filter, page).await?;
    Ok(respond("Conversation Retrieved", PageResponse::new(paged, &page)))
}

#[utoipa::path(
    put,
    path = "/api/conversation/agent/activation/{id}",
    tag = "SMSConversation",
    params(("id" = i32, Path, description = "Conversation ID")),
    request_body = AgentActivationDto,
    responses((status = 200, description = "Flag updated", body = sms_conversation::Model))
)]
#[put("/conversation/agent/activation/{id}")]
pub async fn update_agent_activation(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<AgentActivationDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let updated =
        conversations::set_agent_active(&data.db, path.into_inner(), body.is_agent_active).await?;
    Ok(respond("Agent Activation updated successfully!", updated))
}

#[utoipa::path(
    get,
    path = "/api/conversation/{id}/messages",
    tag = "SMSConversation",
    params(("id" = i32, Path, description = "Conversation ID")),
    responses((status = 200, description = "Messages, newest first", body = [sms_message::Model]))
)]
#[get("/conversation/{id}/messages")]
pub async fn conversation_messages(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let conversation = conversations::find_by_id(&data.db, path.into_inner()).await?;
    let rows = conversations::messages(&data.db, conversation.id).await?;
    Ok(respond("Messages Retrieved", rows))
}

#[utoipa::path(
    get,
    path = "/api/sms/unseen-count",
    tag = "SMS",
    responses((status = 200, description = "Unseen messages across all conversations", body = UnseenCount))
)]
#[get("/sms/unseen-count")]
pub async fn unseen_count(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let count = conversations::unseen_count(&data.db, None).await?;
    Ok(respond("Unseen count", UnseenCount { count }))
}

#[utoipa::path(
    put,
    path = "/api/sms/seen",
    tag = "SMS",
    request_body = MarkSeenDto,
    responses((status = 200, description = "Remaining unseen count", body = UnseenCount))
)]
#[put("/sms/seen")]
pub async fn mark_seen(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<MarkSeenDto>,
) -> Result<HttpResponse, AppError> {
    resolve_admin_context(&req, &data).await?;
    let conversation = conversations::find_by_id(&data.db, body.conversation_id).await?;
    let updated = conversations::mark_seen(&data.db, conversation.id, body.message_id).await?;
    log::debug!("Marked {} messages seen in {}", updated, conversation.id);
    let count = emit_seen(&data, conversation.id).await?;
    Ok(respond("Messages marked as seen", UnseenCount { count }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(sms_callback)
        .service(send_sms)
        .service(generate_sms)
        .service(unseen_count)
        .service(mark_seen)
        .service(find_conversation)
        .service(create_conversation)
        .service(create_test_conversation)
        .service(update_conversation)
        .service(list_conversations)
        .service(update_agent_activation)
        .service(conversation_messages);
}
