//! REST implementation of [`ChannelApi`].
//!
//! Async HTTP client using `reqwest` with bot token authentication.
//! Attachment downloads go through a second client without the
//! `Authorization` header so the token is never sent to the CDN.

use chanvault_protocol::RemoteMessage;
use chanvault_protocol::constants::DELETE_SUCCESS_STATUS;
use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::api::{AttachmentStream, ChannelApi, ChannelFuture};
use crate::config::ChannelConfig;
use crate::error::ChannelError;

/// Channel client over the platform REST API.
pub struct HttpChannel {
    api: reqwest::Client,
    cdn: reqwest::Client,
    messages_url: String,
}

impl HttpChannel {
    /// Creates a client for the configured channel.
    pub fn new(config: &ChannelConfig) -> Result<Self, ChannelError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bot {}", config.token.trim()))
                .map_err(|_| ChannelError::InvalidToken)?,
        );

        let api = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        // No overall timeout: chunk bodies are streamed and may be slow.
        let cdn = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            api,
            cdn,
            messages_url: config.messages_url(),
        })
    }

    fn message_url(&self, message_id: &str) -> String {
        format!("{}/{}", self.messages_url, message_id)
    }

    /// Turns a non-success response into [`ChannelError::Api`].
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ChannelError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

impl ChannelApi for HttpChannel {
    fn post_attachment(&self, filename: &str, data: Vec<u8>) -> ChannelFuture<'_, RemoteMessage> {
        let filename = filename.to_string();
        Box::pin(async move {
            let size = data.len();
            let part = Part::bytes(data)
                .file_name(filename.clone())
                .mime_str("application/octet-stream")?;
            let form = Form::new().part("file", part);

            let resp = self
                .api
                .post(&self.messages_url)
                .multipart(form)
                .send()
                .await?;
            let body = Self::check(resp).await?.bytes().await?;
            let message = RemoteMessage::from_slice(&body)?;

            debug!(message_id = %message.id, filename = %filename, size, "posted attachment");
            Ok(message)
        })
    }

    fn recent_messages(&self, limit: u8) -> ChannelFuture<'_, Vec<RemoteMessage>> {
        Box::pin(async move {
            let resp = self
                .api
                .get(&self.messages_url)
                .query(&[("limit", limit.to_string())])
                .send()
                .await?;
            let body = Self::check(resp).await?.bytes().await?;
            Ok(RemoteMessage::list_from_slice(&body)?)
        })
    }

    fn get_message(&self, message_id: &str) -> ChannelFuture<'_, RemoteMessage> {
        let url = self.message_url(message_id);
        Box::pin(async move {
            let resp = self.api.get(&url).send().await?;
            let body = Self::check(resp).await?.bytes().await?;
            Ok(RemoteMessage::from_slice(&body)?)
        })
    }

    fn delete_message(&self, message_id: &str) -> ChannelFuture<'_, ()> {
        let url = self.message_url(message_id);
        let message_id = message_id.to_string();
        Box::pin(async move {
            let resp = self.api.delete(&url).send().await?;
            let status = resp.status().as_u16();
            if status != DELETE_SUCCESS_STATUS {
                let body = resp.text().await.unwrap_or_default();
                return Err(ChannelError::Api { status, body });
            }
            debug!(message_id = %message_id, "deleted message");
            Ok(())
        })
    }

    fn open_attachment(&self, url: &str) -> ChannelFuture<'_, AttachmentStream> {
        let url = url.to_string();
        Box::pin(async move {
            let resp = self.cdn.get(&url).send().await?;
            let resp = Self::check(resp).await?;
            let stream = resp
                .bytes_stream()
                .map(|piece| piece.map_err(ChannelError::from))
                .boxed();
            Ok(stream)
        })
    }
}
