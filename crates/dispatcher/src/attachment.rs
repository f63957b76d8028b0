//! Attachment loading
//!
//! Content is resolved once per recipient, right before the send.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use contracts::{Attachment, AttachmentSource, ContractError, MediaPayload};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Resolves an [`Attachment`] into transport-ready bytes
#[derive(Debug, Clone)]
pub struct AttachmentLoader {
    client: Client,
}

impl AttachmentLoader {
    pub fn new(timeout: Duration) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::Other(format!("attachment client: {e}")))?;
        Ok(Self { client })
    }

    #[instrument(
        name = "attachment_load",
        skip(self, attachment),
        fields(filename = %attachment.filename)
    )]
    pub async fn load(&self, attachment: &Attachment) -> Result<MediaPayload, ContractError> {
        let data = match &attachment.source {
            AttachmentSource::Inline(content) => decode_inline(content)
                .map_err(|message| ContractError::attachment(&attachment.filename, message))?,
            AttachmentSource::Url(location) => self.fetch(&attachment.filename, location).await?,
        };
        debug!(bytes = data.len(), "Attachment loaded");

        Ok(MediaPayload {
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.clone(),
            data,
        })
    }

    async fn fetch(&self, filename: &str, location: &str) -> Result<Bytes, ContractError> {
        let url = Url::parse(location)
            .map_err(|e| ContractError::attachment(filename, format!("invalid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ContractError::attachment(
                filename,
                format!("unsupported URL scheme '{}'", url.scheme()),
            ));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ContractError::attachment(filename, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::attachment(
                filename,
                format!("download returned {status}"),
            ));
        }
        response
            .bytes()
            .await
            .map_err(|e| ContractError::attachment(filename, e.to_string()))
    }
}

/// Decode plain base64 or a `data:<mime>;base64,<payload>` URL
fn decode_inline(content: &str) -> Result<Bytes, String> {
    let payload = match content.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, payload)) if meta.ends_with(";base64") => payload,
            Some(_) => return Err("only base64 data URLs are supported".to_string()),
            None => return Err("malformed data URL".to_string()),
        },
        None => content,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map(Bytes::from)
        .map_err(|e| format!("invalid base64: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> AttachmentLoader {
        AttachmentLoader::new(Duration::from_secs(5)).unwrap()
    }

    fn attachment(source: AttachmentSource) -> Attachment {
        Attachment::new("a.txt", "text/plain", source).unwrap()
    }

    #[test]
    fn test_decode_inline_variants() {
        assert_eq!(decode_inline("aGk=").unwrap(), Bytes::from_static(b"hi"));
        assert_eq!(
            decode_inline("data:text/plain;base64,aGk=").unwrap(),
            Bytes::from_static(b"hi")
        );
        assert_eq!(decode_inline("aG\nk=").unwrap(), Bytes::from_static(b"hi"));
        assert!(decode_inline("data:text/plain,hi").is_err());
        assert!(decode_inline("data:nocomma").is_err());
        assert!(decode_inline("***").is_err());
    }

    #[tokio::test]
    async fn test_load_inline() {
        let media = loader()
            .load(&attachment(AttachmentSource::Inline("aGk=".into())))
            .await
            .unwrap();
        assert_eq!(media.filename, "a.txt");
        assert_eq!(media.mime_type, "text/plain");
        assert_eq!(media.data, Bytes::from_static(b"hi"));
    }

    #[tokio::test]
    async fn test_load_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote".to_vec()))
            .mount(&server)
            .await;

        let source = AttachmentSource::Url(format!("{}/files/a.txt", server.uri()));
        let media = loader().load(&attachment(source)).await.unwrap();
        assert_eq!(media.data, Bytes::from_static(b"remote"));
    }

    #[tokio::test]
    async fn test_load_url_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let missing = AttachmentSource::Url(format!("{}/gone", server.uri()));
        let err = loader().load(&attachment(missing)).await.unwrap_err();
        assert!(matches!(err, ContractError::Attachment { .. }));

        let ftp = AttachmentSource::Url("ftp://example.com/a.txt".into());
        assert!(loader().load(&attachment(ftp)).await.is_err());
    }
}
