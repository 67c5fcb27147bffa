pub mod auth;
pub mod booking;
pub mod formatting;
pub mod llm;
pub mod mailer;
pub mod notifications;
pub mod prompt;
pub mod realtime;
pub mod sms_agent;
pub mod sms_gateway;
