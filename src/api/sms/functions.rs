use chrono::Months;
use serde_json::json;

use crate::{
    app_state::AppState,
    database::models::{agent, coupon, sms_conversation},
    errors::AppError,
    repositories::{
        agents,
        conversations::{self, ConversationInput},
        customers,
    },
    services::{
        llm::ChatMessage,
        prompt::{PromptContext, system_prompt},
        realtime::events,
        sms_gateway::HistoryQuery,
    },
};

use super::structures::ConversationView;

const HISTORY_MONTHS: u32 = 2;

pub async fn conversation_view(
    state: &AppState,
    conversation: sms_conversation::Model,
) -> Result<ConversationView, AppError> {
    let db = &state.db;
    let customer = match conversation.customer_id {
        Some(id) => Some(customers::find_by_id(db, id).await?),
        None => customers::find_by_phone(db, &conversation.contact).await?,
    };
    let (agent, coupon) = match conversation.agent_id {
        Some(id) => {
            let (agent, coupon) = agents::find_with_coupon(db, id).await?;
            (Some(agent), coupon)
        }
        None => (None, None),
    };
    let res = conversations::messages(db, conversation.id).await?;
    Ok(ConversationView {
        conversation,
        customer,
        agent,
        coupon,
        res,
    })
}

/// Pulls the last two months of gateway history for `contact` into a new local conversation.
/// Returns `None` when the gateway has nothing either.
pub async fn import_history(
    state: &AppState,
    contact: &str,
) -> Result<Option<sms_conversation::Model>, AppError> {
    let did = state.config.sms_did.clone();
    let today = chrono::Utc::now()
        .with_timezone(&state.config.business_timezone())
        .date_naive();
    let query = HistoryQuery {
        from: today.checked_sub_months(Months::new(HISTORY_MONTHS)).unwrap_or(today),
        to: today,
        did: did.clone(),
        contact: contact.to_string(),
    };
    let history = state.sms.get_mms(&query).await?;
    let Some(last) = history.last() else {
        return Ok(None);
    };

    let customer = customers::find_by_phone(&state.db, contact).await?;
    let conversation = conversations::create_or_update(
        &state.db,
        ConversationInput {
            contact: contact.to_string(),
            did: did.clone(),
            last_message: Some(last.message.clone()),
            customer_id: customer.map(|c| c.id),
            ..Default::default()
        },
    )
    .await?;

    for msg in &history {
        let (from, to) = if msg.is_inbound() {
            (conversation.contact.as_str(), did.as_str())
        } else {
            (did.as_str(), conversation.contact.as_str())
        };
        conversations::add_message(&state.db, conversation.id, to, from, &msg.message, true)
            .await?;
    }
    log::info!(
        "Imported {} gateway messages for {}",
        history.len(),
        conversation.contact
    );
    Ok(Some(conversation))
}

fn subject_request(agent: &agent::Model) -> String {
    let mut content = String::from("Generate Subject line for this message, only subject text.");
    if let Some(format) = agent.email_subject_format.as_deref() {
        content.push_str(&format!("\nUse this format: {}", format));
    }
    content
}

/// Prompt for `POST /sms/generate`: the agent persona addressing `name`, optionally followed by
/// a request for a subject line matching an already generated body.
pub fn generation_messages(
    state: &AppState,
    agent: &agent::Model,
    coupon: Option<&coupon::Model>,
    name: &str,
    generated_message: Option<&str>,
    with_subject: bool,
) -> Vec<ChatMessage> {
    let ctx = PromptContext::from_config(&state.config);
    let mut messages = vec![ChatMessage::system(system_prompt(
        &agent.prompt,
        coupon,
        name,
        None,
        &ctx,
    ))];
    if let Some(body) = generated_message.filter(|m| !m.trim().is_empty()) {
        if with_subject {
            messages.push(ChatMessage::system(body));
            messages.push(ChatMessage::user(subject_request(agent)));
        }
    }
    messages
}

/// Tells the inbox how many messages remain unseen and which room was read.
pub async fn emit_seen(state: &AppState, conversation_id: i32) -> Result<u64, AppError> {
    let count = conversations::unseen_count(&state.db, None).await?;
    state
        .realtime
        .emit(None, events::SEEN_UPDATED, json!({ "count": count }));
    state.realtime.emit(
        Some(&conversation_id.to_string()),
        events::SEEN_INDIVIDUAL,
        json!({ "conversationId": conversation_id }),
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_with_format(format: Option<&str>) -> agent::Model {
        let now = chrono::Utc::now();
        agent::Model {
            id: 1,
            name: "Closer".into(),
            r#type: "EMAIL".into(),
            prompt: "Sell [COMPANY_NAME]".into(),
            status_id: 1,
            email_subject_format: format.map(Into::into),
            coupon_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn subject_request_mentions_the_format_only_when_set() {
        assert!(!subject_request(&agent_with_format(None)).contains("Use this format"));
        let text = subject_request(&agent_with_format(Some("{name}: your deal")));
        assert!(text.ends_with("Use this format: {name}: your deal"));
    }
}
