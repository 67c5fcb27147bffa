//! Shared fixtures for unit and handler tests: an in-memory SQLite database with the full schema.

use std::sync::{Arc, Mutex};

use actix_web::{body::MessageBody, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::{
    app_state::AppState,
    config::Config,
    database::{
        models::{add_on, admin, customer, employee, package, service, timeslot},
        schema,
        types::{Role, Status},
    },
    errors::AppError,
    services::{
        auth::{hash_password, issue_token},
        llm::{ChatCompletion, ChatMessage},
        mailer::Mailer,
        realtime::{BroadcastHub, RealtimeEmitter, RealtimeEvent},
        sms_gateway::{GatewayMessage, HistoryQuery, SmsGateway},
    },
};

pub const TEST_DID: &str = "5559990000";
pub const TEST_SECRET: &str = "test-secret";

pub async fn test_db() -> DatabaseConnection {
    // one connection, otherwise each pooled connection gets its own empty database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite");
    schema::sync(&db).await.expect("sync schema");
    db
}

pub struct Fixtures {
    pub customer: customer::Model,
    pub service: service::Model,
    pub package: package::Model,
    pub add_on: add_on::Model,
    pub timeslot: timeslot::Model,
    pub employee: employee::Model,
}

pub async fn seed_customer(db: &DatabaseConnection, email: &str) -> customer::Model {
    customer::ActiveModel {
        first_name: Set(Some("jane".into())),
        last_name: Set(Some("doe".into())),
        email: Set(Some(email.into())),
        phone: Set(Some("5550100".into())),
        address: Set(Some("1 Main St".into())),
        status_id: Set(Status::Active.id()),
        allow_sms: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed customer")
}

pub async fn seed_add_on(db: &DatabaseConnection, name: &str) -> add_on::Model {
    add_on::ActiveModel {
        name: Set(name.into()),
        description: Set(format!("{} add-on", name)),
        price: Set("20".into()),
        duration: Set(30),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed add-on")
}

pub async fn seed_fixtures(db: &DatabaseConnection) -> Fixtures {
    let customer = seed_customer(db, "jane@example.com").await;
    let service = service::ActiveModel {
        name: Set("Full Detail".into()),
        is_popular: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed service");
    let package = package::ActiveModel {
        name: Set("gold".into()),
        display_name: Set("Gold".into()),
        description: Set("Inside and out".into()),
        price: Set("199".into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed package");
    let add_on = seed_add_on(db, "Pet hair removal").await;
    let timeslot = timeslot::ActiveModel {
        time: Set("09:00 AM".into()),
        days: Set("1,2,3,4,5".into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed timeslot");
    let employee = employee::ActiveModel {
        first_name: Set("Mike".into()),
        last_name: Set("Ross".into()),
        email: Set("mike@example.com".into()),
        password: Set("hash".into()),
        status_id: Set(Status::Active.id()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed employee");

    Fixtures {
        customer,
        service,
        package,
        add_on,
        timeslot,
        employee,
    }
}

#[derive(Default)]
pub struct FakeSms {
    pub sent: Mutex<Vec<(String, String)>>,
    pub history: Mutex<Vec<GatewayMessage>>,
}

#[async_trait]
impl SmsGateway for FakeSms {
    async fn send_mms(&self, _did: &str, dst: &str, message: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((dst.to_string(), message.to_string()));
        Ok(())
    }

    async fn get_mms(&self, _query: &HistoryQuery) -> Result<Vec<GatewayMessage>, AppError> {
        Ok(self.history.lock().unwrap().clone())
    }
}

/// Answers every completion with `reply` and keeps the prompts it saw.
pub struct FakeLlm {
    pub reply: String,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl ChatCompletion for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    pub events: Mutex<Vec<RealtimeEvent>>,
}

impl RealtimeEmitter for RecordingEmitter {
    fn emit(&self, room: Option<&str>, event: &str, payload: serde_json::Value) {
        self.events.lock().unwrap().push(RealtimeEvent {
            room: room.unwrap_or("global").to_string(),
            event: event.to_string(),
            payload,
        });
    }
}

impl RecordingEmitter {
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event.clone())
            .collect()
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_html(&self, to: &str, subject: &str, _html: String) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: TEST_SECRET.into(),
        hash_salt_rounds: 4,
        sms_did: TEST_DID.into(),
        smtp_email: Some("inbox@example.com".into()),
        agent_reply_delay_secs: 0,
        ..Config::default()
    }
}

/// `AppState` over an in-memory database with every collaborator faked.
pub struct TestHarness {
    pub state: AppState,
    pub sms: Arc<FakeSms>,
    pub llm: Arc<FakeLlm>,
    pub emitter: Arc<RecordingEmitter>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = test_db().await;
        let sms = Arc::new(FakeSms::default());
        let llm = Arc::new(FakeLlm {
            reply: "Thanks for reaching out!".into(),
            calls: Mutex::new(Vec::new()),
        });
        let emitter = Arc::new(RecordingEmitter::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState {
            db,
            config,
            sms: sms.clone(),
            llm: llm.clone(),
            mailer: mailer.clone(),
            realtime: emitter.clone(),
            hub: BroadcastHub::new(),
        };
        Self {
            state,
            sms,
            llm,
            emitter,
            mailer,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn data(&self) -> web::Data<AppState> {
        web::Data::new(self.state.clone())
    }

    pub async fn customer_with_password(&self, email: &str, password: &str) -> customer::Model {
        customer::ActiveModel {
            first_name: Set(Some("jane".into())),
            last_name: Set(Some("doe".into())),
            email: Set(Some(email.into())),
            password: Set(Some(hash_password(password, 4).unwrap())),
            status_id: Set(Status::Active.id()),
            allow_sms: Set(true),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed customer")
    }

    /// `Authorization` header value for a freshly seeded admin.
    pub async fn admin_token(&self) -> String {
        let admin = admin::ActiveModel {
            first_name: Set("Ada".into()),
            last_name: Set("Admin".into()),
            email: Set("admin@example.com".into()),
            password: Set(hash_password("admin-pass", 4).unwrap()),
            status_id: Set(Status::Active.id()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed admin");
        issue_token(TEST_SECRET, admin.id, &admin.email, Role::Admin, false).unwrap()
    }
}

pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> serde_json::Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("json body")
}
