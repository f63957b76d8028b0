//! HTTP messaging gateway client
//!
//! The gateway owns the messaging session; this client only forwards the four
//! transport calls:
//!
//! | call            | request                                   |
//! |-----------------|-------------------------------------------|
//! | session state   | `GET  {base}/session` → `{"state": "CONNECTED"}` |
//! | registration    | `GET  {base}/contacts/{chat_id}` → `{"registered": bool}` |
//! | text            | `POST {base}/messages` `{chat_id, text}`  |
//! | media           | `POST {base}/messages` `{chat_id, caption, media}` |

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use contracts::{ContractError, MediaPayload, MessagingTransport, SessionState, TransportConfig};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const TRANSPORT_NAME: &str = "gateway";

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl From<&TransportConfig> for GatewayConfig {
    fn from(config: &TransportConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    state: SessionState,
}

#[derive(Deserialize)]
struct ContactResponse {
    registered: bool,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct MediaMessage<'a> {
    chat_id: &'a str,
    caption: &'a str,
    media: MediaBody<'a>,
}

#[derive(Serialize)]
struct MediaBody<'a> {
    filename: &'a str,
    mimetype: &'a str,
    /// base64
    data: String,
}

/// Messaging gateway transport
#[derive(Debug, Clone)]
pub struct GatewayTransport {
    client: Client,
    base_url: String,
}

impl GatewayTransport {
    pub fn new(config: GatewayConfig) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ContractError::transport(TRANSPORT_NAME, e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_message<B: Serialize>(&self, body: &B) -> Result<(), ContractError> {
        let response = self
            .client
            .post(self.url("messages"))
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;
        Ok(())
    }
}

fn request_error(err: reqwest::Error) -> ContractError {
    ContractError::transport(TRANSPORT_NAME, err.to_string())
}

async fn check_status(response: Response) -> Result<Response, ContractError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ContractError::transport(
        TRANSPORT_NAME,
        format!("gateway returned {status}: {body}"),
    ))
}

impl MessagingTransport for GatewayTransport {
    fn name(&self) -> &str {
        TRANSPORT_NAME
    }

    #[instrument(name = "gateway_session_state", skip(self))]
    async fn session_state(&self) -> Result<SessionState, ContractError> {
        let response = self
            .client
            .get(self.url("session"))
            .send()
            .await
            .map_err(request_error)?;
        let session: SessionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(request_error)?;
        debug!(state = %session.state, "gateway session state");
        Ok(session.state)
    }

    #[instrument(name = "gateway_is_registered", skip(self))]
    async fn is_registered(&self, chat_id: &str) -> Result<bool, ContractError> {
        let response = self
            .client
            .get(self.url(&format!("contacts/{chat_id}")))
            .send()
            .await
            .map_err(request_error)?;
        let contact: ContactResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(request_error)?;
        Ok(contact.registered)
    }

    #[instrument(name = "gateway_send_text", skip(self, text))]
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ContractError> {
        self.post_message(&TextMessage { chat_id, text }).await
    }

    #[instrument(
        name = "gateway_send_media",
        skip(self, media, caption),
        fields(filename = %media.filename, bytes = media.data.len())
    )]
    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaPayload,
        caption: &str,
    ) -> Result<(), ContractError> {
        let body = MediaMessage {
            chat_id,
            caption,
            media: MediaBody {
                filename: &media.filename,
                mimetype: &media.mime_type,
                data: STANDARD.encode(&media.data),
            },
        };
        self.post_message(&body).await
    }
}
