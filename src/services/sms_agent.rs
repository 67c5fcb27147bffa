//! Inbound SMS handling and the delayed agent reply.

use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;

use crate::{
    app_state::AppState,
    database::{
        models::{sms_conversation, sms_message},
        types::Status,
    },
    errors::AppError,
    repositories::{agents, conversations, customers, sms_crons},
    services::{
        llm::ChatMessage,
        prompt::{PromptContext, system_prompt},
        realtime::events,
    },
};

#[derive(Debug, Clone)]
pub struct InboundSms {
    pub to: String,
    pub from: String,
    pub message: String,
}

fn is_opt_out(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("stop") || lower.contains("unsub")
}

fn emit_message(state: &AppState, conversation_id: i32, msg: &sms_message::Model) {
    state.realtime.emit(
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
}

/// Records an inbound message and, when an active agent owns the conversation, schedules its
/// reply. The returned handle resolves once the reply has been generated and sent.
pub async fn receive(state: &AppState, inbound: InboundSms) -> Result<JoinHandle<()>, AppError> {
    let db = &state.db;
    let did = state.config.sms_did.as_str();

    let conversation = conversations::find_by_phone(db, &inbound.from, did)
        .await?
        .ok_or_else(|| AppError::invalid("conversation not found!"))?;
    let is_test = conversation.is_test();

    if !is_test {
        if let Some(cron_id) = conversation.sms_cron_id {
            sms_crons::mark_clicked(db, cron_id).await?;
        }
    }

    let msg = conversations::add_message(
        db,
        conversation.id,
        &inbound.to,
        &inbound.from,
        &inbound.message,
        is_test,
    )
    .await?;
    let conversation = conversations::set_last_message(db, conversation, &inbound.message).await?;

    emit_message(state, conversation.id, &msg);
    if !is_test {
        state
            .realtime
            .emit(None, events::NEW_SMS, json!({ "conversationId": conversation.id }));
    }

    if is_opt_out(&inbound.message) {
        if let Some(customer_id) = conversation.customer_id {
            customers::set_allow_sms(db, customer_id, false).await?;
            log::info!("Customer {} opted out of SMS", customer_id);
        }
    }

    let agent_id = conversation
        .agent_id
        .ok_or_else(|| AppError::invalid("Agent not found!"))?;
    let agent = agents::find_by_id(db, agent_id)
        .await
        .map_err(|_| AppError::invalid("Agent not found!"))?;
    if agent.status_id == Status::InActive.id() || !conversation.is_agent_active {
        return Err(AppError::invalid("Agent is inactive!"));
    }

    let delay = if is_test {
        Duration::ZERO
    } else {
        state.config.agent_reply_delay()
    };
    Ok(schedule_reply(state.clone(), conversation.id, inbound.from, delay))
}

pub fn schedule_reply(
    state: AppState,
    conversation_id: i32,
    sender: String,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Err(err) = reply(&state, conversation_id, &sender).await {
            log::error!(
                "Agent reply for conversation {} failed: {}",
                conversation_id,
                err
            );
        }
    })
}

fn chat_history(messages: &[sms_message::Model], sender: &str) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: if msg.from == sender { "user" } else { "system" }.to_string(),
            content: msg.message.clone(),
        })
        .collect()
}

fn recipient_name(conversation: &sms_conversation::Model, first_name: Option<&str>) -> String {
    first_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| conversation.test_field("name"))
        .unwrap_or_default()
        .to_string()
}

/// Generates, stores, emits and sends one agent reply. Returns `None` when the agent was
/// switched off while the reply was pending.
pub async fn reply(
    state: &AppState,
    conversation_id: i32,
    sender: &str,
) -> Result<Option<sms_message::Model>, AppError> {
    let db = &state.db;
    let conversation = conversations::find_by_id(db, conversation_id).await?;
    let Some(agent_id) = conversation.agent_id else {
        return Ok(None);
    };
    let (agent, coupon) = agents::find_with_coupon(db, agent_id).await?;
    if !conversation.is_agent_active || agent.status_id == Status::InActive.id() {
        log::info!("Agent deactivated before replying to {}", conversation_id);
        return Ok(None);
    }

    let customer = match conversation.customer_id {
        Some(id) => Some(customers::find_by_id(db, id).await?),
        None => None,
    };
    let name = recipient_name(
        &conversation,
        customer.as_ref().and_then(|c| c.first_name.as_deref()),
    );

    let ctx = PromptContext::from_config(&state.config);
    let prompt = system_prompt(
        &agent.prompt,
        coupon.as_ref(),
        &name,
        conversation.test_field("vehicleName"),
        &ctx,
    );
    let history = conversations::history(db, conversation.id).await?;
    let mut messages = vec![ChatMessage::system(prompt)];
    messages.extend(chat_history(&history, sender));

    let answer = state.llm.complete(&messages).await?;

    let did = state.config.sms_did.clone();
    let msg = conversations::add_message(db, conversation.id, sender, &did, &answer, true).await?;
    let conversation = conversations::set_last_message(db, conversation, &answer).await?;
    emit_message(state, conversation.id, &msg);

    if let Err(err) = deliver(state, sender, &answer, conversation.is_test()).await {
        log::error!("SMS agent failed to send reply to {}: {}", sender, err);
    }

    Ok(Some(msg))
}

/// Sends through the gateway. Test conversations and development mode never leave the system.
pub async fn deliver(
    state: &AppState,
    dst: &str,
    message: &str,
    is_test: bool,
) -> Result<bool, AppError> {
    if is_test || state.config.is_dev() {
        log::info!("SMS not sent: {}", message);
        return Ok(false);
    }
    state.sms.send_mms(&state.config.sms_did, dst, message).await?;
    log::info!("SMS sent to {}", dst);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repositories::{agents::AgentInput, conversations::ConversationInput},
        services::realtime::NoopEmitter,
        test_support::{TEST_DID, TestHarness, test_config},
    };
    use std::sync::Arc;

    #[test]
    fn opt_out_keywords_match_anywhere_case_insensitive() {
        assert!(is_opt_out("Please STOP texting"));
        assert!(is_opt_out("unsubscribe"));
        assert!(!is_opt_out("sounds good"));
    }

    #[test]
    fn history_roles_follow_the_sender() {
        let now = chrono::Utc::now();
        let msg = |from: &str, text: &str| sms_message::Model {
            id: 0,
            to: "x".into(),
            from: from.into(),
            message: text.into(),
            seen: true,
            conversation_id: 1,
            created_at: now,
        };
        let history = chat_history(&[msg("5559990000", "Hi!"), msg("5550100", "hello")], "5550100");
        assert_eq!(history[0].role, "system");
        assert_eq!(history[1].role, "user");
    }

    #[tokio::test]
    async fn test_conversations_reply_at_once_and_never_reach_the_gateway() {
        let mut harness = TestHarness::new().await;
        harness.state.realtime = Arc::new(NoopEmitter);
        let db = harness.db().clone();
        let agent = agents::create_or_update(
            &db,
            AgentInput {
                name: "Closer".into(),
                r#type: "SMS".into(),
                prompt: "Hi from [COMPANY_NAME]".into(),
                status_id: None,
                email_subject_format: None,
                coupon_id: None,
            },
        )
        .await
        .unwrap();
        let conversation = conversations::create_or_update(
            &db,
            ConversationInput {
                contact: "5550142".into(),
                did: TEST_DID.into(),
                test: Some(json!({ "name": "sam", "vehicleName": "Civic" })),
                agent_id: Some(agent.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let handle = receive(
            &harness.state,
            InboundSms {
                to: TEST_DID.into(),
                from: "5550142".into(),
                message: "when can you come?".into(),
            },
        )
        .await
        .unwrap();
        handle.await.unwrap();

        let history = conversations::history(&db, conversation.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.seen));
        assert!(harness.sms.sent.lock().unwrap().is_empty());

        let prompt = &harness.llm.calls.lock().unwrap()[0][0].content;
        assert!(prompt.contains("name: Sam"));
        assert!(prompt.contains("vehicle: Civic"));
    }

    #[tokio::test]
    async fn development_mode_keeps_replies_off_the_gateway() {
        let harness = TestHarness::with_config(crate::config::Config {
            app_env: Some("development".into()),
            ..test_config()
        })
        .await;

        let sent = deliver(&harness.state, "5550100", "hello", false).await.unwrap();
        assert!(!sent);
        assert!(harness.sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn production_delivers_to_the_contact() {
        let harness = TestHarness::new().await;

        assert!(deliver(&harness.state, "5550100", "hello", false).await.unwrap());
        assert!(!deliver(&harness.state, "5550100", "hidden", true).await.unwrap());
        assert_eq!(
            *harness.sms.sent.lock().unwrap(),
            vec![("5550100".to_string(), "hello".to_string())]
        );
    }
}
