use anyhow::{anyhow, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{config::StargazerConfig, notifier::Notifier};

/// Posts messages to a Slack channel through the `chat.postMessage` Web API method.
pub struct SlackNotifier {
    client: Client,
    endpoint: String,
    token: String,
    channel: String,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Slack answers 200 even for refused calls, the outcome lives in `ok`.
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackResponse {
    fn into_result(self) -> anyhow::Result<()> {
        if self.ok {
            Ok(())
        } else {
            Err(anyhow!(
                "Slack refused the message: {}",
                self.error.as_deref().unwrap_or("no error given")
            ))
        }
    }
}

impl SlackNotifier {
    pub fn new(config: &StargazerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.notify_timeout())
            .build()
            .context("couldn't build HTTP client")?;

        let endpoint = format!(
            "{}/chat.postMessage",
            config.slack_api_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            token: config.slack_token.clone(),
            channel: config.slack_channel.clone(),
        })
    }
}

#[rocket::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        trace!("posting to {} in channel {}", self.endpoint, self.channel);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: &self.channel,
                text,
            })
            .send()
            .await
            .context("couldn't reach Slack")?
            .error_for_status()
            .context("Slack returned an error status")?;

        let response: SlackResponse = response
            .json()
            .await
            .context("couldn't parse Slack response")?;
        debug!("Slack response: {:?}", response);

        response.into_result()
    }
}
