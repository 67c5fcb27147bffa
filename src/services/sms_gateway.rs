use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

use crate::{config::Config, errors::AppError};

/// A message as reported by the gateway history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GatewayMessage {
    pub id: Option<String>,
    pub date: String,
    /// "1" inbound, "0" outbound.
    #[serde(rename = "type")]
    pub direction: String,
    pub did: String,
    pub contact: String,
    pub message: String,
}

impl GatewayMessage {
    pub fn is_inbound(&self) -> bool {
        self.direction == "1"
    }
}

#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
    pub did: String,
    pub contact: String,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_mms(&self, did: &str, dst: &str, message: &str) -> Result<(), AppError>;

    async fn get_mms(&self, query: &HistoryQuery) -> Result<Vec<GatewayMessage>, AppError>;
}

#[derive(Debug, Deserialize)]
struct GatewayStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    status: String,
    #[serde(default)]
    sms: Vec<GatewayMessage>,
}

/// voip.ms REST client. Every call is a GET with credentials and a `method` in the query string.
#[derive(Clone)]
pub struct VoipMsGateway {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl VoipMsGateway {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            username,
            password,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.sms_api_url.clone(),
            config.sms_username.clone().unwrap_or_default(),
            config.sms_password.clone().unwrap_or_default(),
        )
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<R, AppError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("api_username", self.username.as_str()),
                ("api_password", self.password.as_str()),
                ("method", method),
            ])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::error!("SMS gateway error on {}: {} - {}", method, status, error_text);
            return Err(AppError::Upstream(format!(
                "SMS gateway request failed with status {}",
                status
            )));
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl SmsGateway for VoipMsGateway {
    async fn send_mms(&self, did: &str, dst: &str, message: &str) -> Result<(), AppError> {
        let result: GatewayStatus = self
            .request("sendMMS", &[("did", did), ("dst", dst), ("message", message)])
            .await?;
        if result.status != "success" {
            log::error!("SMS gateway rejected message to {}: {}", dst, result.status);
            return Err(AppError::Upstream(format!("Failed to send SMS: {}", result.status)));
        }
        Ok(())
    }

    async fn get_mms(&self, query: &HistoryQuery) -> Result<Vec<GatewayMessage>, AppError> {
        let from = query.from.format("%Y-%m-%d").to_string();
        let to = query.to.format("%Y-%m-%d").to_string();
        let result: HistoryResponse = self
            .request(
                "getMMS",
                &[
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                    ("type", "1"),
                    ("did", query.did.as_str()),
                    ("contact", query.contact.as_str()),
                    ("all_messages", "1"),
                ],
            )
            .await?;
        match result.status.as_str() {
            "success" => Ok(result.sms),
            "no_sms" => Ok(Vec::new()),
            other => Err(AppError::Upstream(format!("Failed to fetch SMS history: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway(server: &mockito::Server) -> VoipMsGateway {
        VoipMsGateway::new(server.url(), "user".into(), "secret".into())
    }

    #[tokio::test]
    async fn send_mms_succeeds_on_success_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "sendMMS".into()),
                Matcher::UrlEncoded("api_username".into(), "user".into()),
                Matcher::UrlEncoded("dst".into(), "5550100".into()),
                Matcher::UrlEncoded("message".into(), "hello there".into()),
            ]))
            .with_body(r#"{"status":"success","mms":123}"#)
            .create_async()
            .await;

        gateway(&server)
            .send_mms("5559990000", "5550100", "hello there")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_mms_fails_on_other_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":"invalid_dst"}"#)
            .create_async()
            .await;

        let err = gateway(&server)
            .send_mms("5559990000", "bad", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn get_mms_treats_no_sms_as_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("method".into(), "getMMS".into()))
            .with_body(r#"{"status":"no_sms"}"#)
            .create_async()
            .await;

        let query = HistoryQuery {
            from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            did: "5559990000".into(),
            contact: "5550100".into(),
        };
        assert!(gateway(&server).get_mms(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_mms_returns_history() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("method".into(), "getMMS".into()))
            .with_body(
                r#"{"status":"success","sms":[{"id":"1","date":"2024-02-01 10:00:00","type":"1","did":"5559990000","contact":"5550100","message":"hi"}]}"#,
            )
            .create_async()
            .await;

        let query = HistoryQuery {
            from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            did: "5559990000".into(),
            contact: "5550100".into(),
        };
        let history = gateway(&server).get_mms(&query).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_inbound());
    }
}
