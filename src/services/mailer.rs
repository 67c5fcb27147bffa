use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{config::Config, errors::AppError};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), AppError>;
}

/// SMTP over implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::invalid("SMTP_HOST is not configured"))?;
        let sender = config
            .smtp_email
            .as_deref()
            .ok_or_else(|| AppError::invalid("SMTP_EMAIL is not configured"))?;
        let from: Mailbox = sender
            .parse()
            .map_err(|_| AppError::invalid(format!("Invalid SMTP_EMAIL: {}", sender)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|err| AppError::Upstream(format!("SMTP relay setup failed: {}", err)))?
            .port(config.smtp_port);
        if let (Some(login), Some(password)) = (&config.smtp_login, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(login.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), AppError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| AppError::invalid(format!("Invalid recipient: {}", to)))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|err| AppError::Upstream(format!("Failed to build email: {}", err)))?;

        self.transport.send(email).await.map_err(|err| {
            log::error!("SMTP send failed: {}", err);
            AppError::Upstream(format!("Failed to send email: {}", err))
        })?;
        Ok(())
    }
}

/// Used when SMTP is not configured; mail is logged and dropped.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_html(&self, to: &str, subject: &str, _html: String) -> Result<(), AppError> {
        log::info!("SMTP disabled, dropping mail to {}: {}", to, subject);
        Ok(())
    }
}
