//! Connection settings for the channel API.

use std::time::Duration;

use crate::error::ChannelError;

/// Default REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Default `User-Agent` sent with every API request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/lobinuxsoft/chanvault, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Settings needed to reach one storage channel.
///
/// Built once at startup and handed to [`HttpChannel::new`](crate::HttpChannel::new).
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// REST base URL without trailing slash.
    pub base_url: String,
    /// Bot token (sent as `Authorization: Bot <token>`).
    pub token: String,
    /// Id of the channel used as the blob store.
    pub channel_id: String,
    pub user_agent: String,
    /// Per-request timeout. Chunk posts carry up to 25 MB.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ChannelConfig {
    /// Creates a config with default endpoint and timeouts.
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: token.into(),
            channel_id: channel_id.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(15),
        }
    }

    /// Overrides the REST base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Checks that both credentials are present.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if self.token.trim().is_empty() {
            return Err(ChannelError::MissingCredential("token"));
        }
        if self.channel_id.trim().is_empty() {
            return Err(ChannelError::MissingCredential("channel id"));
        }
        Ok(())
    }

    /// Base URL of the channel's message collection.
    pub fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.base_url, self.channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChannelConfig::new("tok", "123");
        assert_eq!(config.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.user_agent.starts_with("DiscordBot"));
    }

    #[test]
    fn messages_url_joins_channel() {
        let config = ChannelConfig::new("tok", "123").with_base_url("http://127.0.0.1:9/api/");
        assert_eq!(
            config.messages_url(),
            "http://127.0.0.1:9/api/channels/123/messages"
        );
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        assert!(ChannelConfig::new("tok", "123").validate().is_ok());
        assert!(matches!(
            ChannelConfig::new("", "123").validate(),
            Err(ChannelError::MissingCredential("token"))
        ));
        assert!(matches!(
            ChannelConfig::new("tok", "  ").validate(),
            Err(ChannelError::MissingCredential("channel id"))
        ));
    }
}
