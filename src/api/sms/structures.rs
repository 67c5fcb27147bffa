use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::database::models::{agent, coupon, customer, sms_conversation, sms_message};

/// Query string the gateway calls us back with.
#[derive(Deserialize, IntoParams, Clone, Debug)]
#[into_params(parameter_in = Query)]
pub struct SmsCallbackQuery {
    pub to: String,
    pub from: String,
    pub message: String,
    pub id: Option<String>,
}

#[derive(Serialize, ToSchema, Clone, Debug)]
pub struct SmsCallbackEcho {
    pub to: String,
    pub from: String,
    pub message: String,
    pub id: Option<String>,
}

impl From<SmsCallbackQuery> for SmsCallbackEcho {
    fn from(q: SmsCallbackQuery) -> Self {
        Self {
            to: q.to,
            from: q.from,
            message: q.message,
            id: q.id,
        }
    }
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsDto {
    pub dst: String,
    pub message: String,
    #[serde(default)]
    pub test: bool,
    pub conversation_id: Option<i32>,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SentSms {
    pub id: Option<i32>,
    pub to: String,
    pub from: String,
    pub message: String,
    /// False when the message stayed local (test conversation or dev mode).
    pub delivered: bool,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSmsDto {
    pub agent_id: i32,
    pub customer_id: Option<i32>,
    pub generated_message: Option<String>,
    #[serde(default)]
    pub with_subject: bool,
}

#[derive(Deserialize, IntoParams, Clone)]
#[into_params(parameter_in = Query)]
pub struct ConversationLookup {
    pub id: Option<i32>,
    pub contact: Option<String>,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub conversation: sms_conversation::Model,
    pub customer: Option<customer::Model>,
    pub agent: Option<agent::Model>,
    pub coupon: Option<coupon::Model>,
    /// Newest first.
    pub res: Vec<sms_message::Model>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationDto {
    pub contact: String,
    pub customer: Option<i32>,
    pub last_message: Option<String>,
    pub agent: Option<i32>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConversationDto {
    pub id: i32,
    pub last_message: Option<String>,
    pub agent: Option<i32>,
    pub customer: Option<i32>,
    pub is_agent_active: Option<bool>,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestConversationDto {
    pub contact: String,
    pub agent_id: i32,
    pub name: String,
    pub vehicle_name: String,
}

#[derive(Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConversationListQuery {
    /// Matches the contact or the customer's name and email.
    pub query_string: Option<String>,
    pub current: Option<u64>,
    pub page_size: Option<u64>,
    /// `true` lists only test conversations.
    #[serde(default)]
    pub test: bool,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AgentActivationDto {
    pub is_agent_active: bool,
}

#[derive(Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenDto {
    pub conversation_id: i32,
    pub message_id: Option<i32>,
}

#[derive(Serialize, ToSchema, Clone)]
pub struct UnseenCount {
    pub count: u64,
}
