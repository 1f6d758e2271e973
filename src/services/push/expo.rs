use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PushProvider;

const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

pub struct ExpoPushProvider {
    access_token: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ExpoMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    data: serde_json::Value,
    sound: &'a str,
}

#[derive(Deserialize)]
struct ExpoResponse {
    data: Vec<ExpoTicket>,
}

#[derive(Deserialize)]
struct ExpoTicket {
    status: String,
    message: Option<String>,
}

impl ExpoPushProvider {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushProvider for ExpoPushProvider {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()> {
        let message = ExpoMessage {
            to: token,
            title,
            body,
            data,
            sound: "default",
        };

        let mut request = self.client.post(EXPO_PUSH_URL).json(&message);
        if !self.access_token.is_empty() {
            request = request.bearer_auth(&self.access_token);
        }

        let response = request
            .send()
            .await
            .context("failed to reach Expo push API")?
            .error_for_status()
            .context("Expo push API returned error")?;

        let tickets: ExpoResponse = response
            .json()
            .await
            .context("failed to parse Expo push response")?;

        for ticket in &tickets.data {
            if ticket.status == "error" {
                anyhow::bail!(
                    "Expo push ticket error: {}",
                    ticket.message.as_deref().unwrap_or("unknown")
                );
            }
        }

        Ok(())
    }
}
