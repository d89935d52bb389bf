use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Client for the Telegram Bot API `sendMessage` method.
///
/// The credential and chat id are optional at construction time; a missing
/// value is reported by [`TelegramClient::send_message`] before any request is made.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: Url,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramClient {
    /// Creates a new client with the provided configuration.
    pub fn new(
        bot_token: Option<String>,
        chat_id: Option<String>,
        base_url: Url,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url,
            bot_token,
            chat_id,
        }
    }

    /// Returns `true` when both the credential and the chat id are present.
    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// Posts one HTML-formatted message to the configured chat.
    ///
    /// On success the raw response body is returned as the delivery confirmation.
    pub async fn send_message(&self, text: &str) -> Result<String, DeliveryError> {
        let bot_token = self
            .bot_token
            .as_deref()
            .ok_or(DeliveryError::MissingConfiguration("TELEGRAM_TOKEN"))?;
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or(DeliveryError::MissingConfiguration("CHAT_ID"))?;

        let url = self.base_url.join(&format!("./bot{bot_token}/sendMessage"))?;
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| DeliveryError::Http(err.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unavailable>"));
        if !status.is_success() {
            return Err(DeliveryError::Status { status, body });
        }

        Ok(body)
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Errors produced while delivering a notification.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("missing configuration value {0}")]
    MissingConfiguration(&'static str),
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    /// Transport failure; the URL is stripped because it embeds the bot token.
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl DeliveryError {
    /// Short label used for metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::MissingConfiguration(_) => "unconfigured",
            Self::Url(_) => "invalid_url",
            Self::Http(_) => "transport",
            Self::Status { .. } => "status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(base_url: &Url, token: Option<&str>, chat_id: Option<&str>) -> TelegramClient {
        TelegramClient::new(
            token.map(str::to_string),
            chat_id.map(str::to_string),
            base_url.clone(),
            Client::builder().build().expect("client"),
        )
    }

    #[tokio::test]
    async fn send_message_posts_html_payload() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/")).expect("url");
        let client = client(&base, Some("test-token"), Some("-100200"));

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/bottest-token/sendMessage")
                    .json_body(json!({
                        "chat_id": "-100200",
                        "text": "<b>hello</b>",
                        "parse_mode": "HTML",
                        "disable_web_page_preview": true
                    }));
                then.status(200)
                    .body(r#"{"ok":true,"result":{"message_id":42}}"#);
            })
            .await;

        let confirmation = client
            .send_message("<b>hello</b>")
            .await
            .expect("send message");
        mock.assert_async().await;
        assert_eq!(confirmation, r#"{"ok":true,"result":{"message_id":42}}"#);
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/proxy/")).expect("url");
        let client = client(&base, Some("test-token"), Some("1"));

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/proxy/bottest-token/sendMessage");
                then.status(200).body("{}");
            })
            .await;

        client.send_message("hi").await.expect("send message");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_returns_body() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/")).expect("url");
        let client = client(&base, Some("test-token"), Some("1"));

        server
            .mock_async(|when, then| {
                when.method(POST).path("/bottest-token/sendMessage");
                then.status(400)
                    .body(r#"{"ok":false,"description":"Bad Request: can't parse entities"}"#);
            })
            .await;

        let err = client.send_message("<b>").await.expect_err("should error");
        assert_eq!(err.metric_label(), "status");
        match err {
            DeliveryError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("can't parse entities"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let base = Url::parse("http://127.0.0.1:1/").expect("url");
        let client = client(&base, Some("secret-token"), Some("1"));

        let err = client.send_message("hi").await.expect_err("should error");
        assert_eq!(err.metric_label(), "transport");
        assert!(!err.to_string().contains("secret-token"));
        assert!(!format!("{err:?}").contains("secret-token"));
    }

    #[tokio::test]
    async fn missing_configuration_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/")).expect("url");

        let mock = server
            .mock_async(|when, then| {
                when.path_contains("sendMessage");
                then.status(200);
            })
            .await;

        let no_token = client(&base, None, Some("1"));
        assert!(!no_token.is_configured());
        let err = no_token.send_message("hi").await.expect_err("no token");
        assert!(matches!(
            err,
            DeliveryError::MissingConfiguration("TELEGRAM_TOKEN")
        ));

        let no_chat = client(&base, Some("test-token"), None);
        let err = no_chat.send_message("hi").await.expect_err("no chat");
        assert!(matches!(err, DeliveryError::MissingConfiguration("CHAT_ID")));

        mock.assert_hits_async(0).await;
    }
}
