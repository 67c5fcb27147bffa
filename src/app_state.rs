use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::{
    llm::{ChatCompletion, OpenAiClient},
    mailer::{Mailer, NoopMailer, SmtpMailer},
    realtime::{BroadcastHub, RealtimeEmitter},
    sms_gateway::{SmsGateway, VoipMsGateway},
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub sms: Arc<dyn SmsGateway>,
    pub llm: Arc<dyn ChatCompletion>,
    pub mailer: Arc<dyn Mailer>,
    pub realtime: Arc<dyn RealtimeEmitter>,
    /// Subscription side of `realtime` for the SSE endpoint.
    pub hub: BroadcastHub,
}

impl AppState {
    /// Wires the production clients. SMTP falls back to a no-op mailer when unconfigured.
    pub fn from_config(db: DatabaseConnection, config: Config) -> Self {
        let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&config) {
            Ok(mailer) => Arc::new(mailer),
            Err(err) => {
                log::warn!("Email disabled: {}", err);
                Arc::new(NoopMailer)
            }
        };
        let hub = BroadcastHub::new();

        Self {
            sms: Arc::new(VoipMsGateway::from_config(&config)),
            llm: Arc::new(OpenAiClient::from_config(&config)),
            mailer,
            realtime: Arc::new(hub.clone()),
            hub,
            db,
            config,
        }
    }
}
