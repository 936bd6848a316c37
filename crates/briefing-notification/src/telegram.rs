//! 텔레그램 전송기.
//!
//! Telegram Bot API(`sendMessage`, `sendPhoto`, `getMe`)를 직접 호출합니다.
//! HTML 모드 전송이 거부되면 태그를 지운 일반 텍스트로 한 번 더 보냅니다.

use async_trait::async_trait;
use briefing_core::TelegramSettings;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::format::{chunk_message, strip_tags, MAX_MESSAGE_CHARS};
use crate::types::{ChatTransport, NotificationError, NotificationResult, ParseMode};

/// Bot API 기본 주소.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 텔레그램 전송 설정.
#[derive(Debug)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: SecretString,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// API 주소 (테스트용으로 교체 가능)
    pub api_base: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let bot_token: String = bot_token.into();
        Self {
            bot_token: SecretString::new(bot_token.into()),
            chat_id: chat_id.into(),
            enabled: true,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// 설정 파일 섹션에서 생성합니다. 토큰이나 채팅 ID가 없으면 `None`.
    pub fn from_settings(settings: &TelegramSettings) -> Option<Self> {
        let token = settings.bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = settings.chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some(Self {
            enabled: settings.enabled,
            ..Self::new(token, chat_id)
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// `getMe` 결과.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// 텔레그램 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 설정 파일 섹션에서 전송기를 생성합니다.
    pub fn from_settings(settings: &TelegramSettings) -> Option<Self> {
        TelegramConfig::from_settings(settings).map(Self::new)
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token.expose_secret(),
            method
        )
    }

    /// 숫자형 채팅 ID는 숫자로, 채널명은 문자열로 보냅니다.
    fn chat_id_value(&self) -> serde_json::Value {
        match self.config.chat_id.parse::<i64>() {
            Ok(id) => serde_json::Value::from(id),
            Err(_) => serde_json::Value::from(self.config.chat_id.clone()),
        }
    }

    /// 봇 상태 확인.
    pub async fn get_me(&self) -> NotificationResult<BotIdentity> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await?;
        let identity: BotIdentity = Self::read_response(response).await?.ok_or_else(|| {
            NotificationError::SendFailed("getMe 응답에 result가 없습니다".to_string())
        })?;

        info!(
            bot = %identity.first_name,
            username = identity.username.as_deref().unwrap_or("Unknown"),
            "Telegram bot connected"
        );
        Ok(identity)
    }

    /// 한 조각의 메시지를 전송합니다. HTML이 거부되면 일반 텍스트로 재전송합니다.
    async fn send_message(&self, text: &str, mode: ParseMode) -> NotificationResult<()> {
        match self.post_message(text, mode).await {
            Err(NotificationError::SendFailed(reason)) if mode == ParseMode::Html => {
                warn!(%reason, "HTML message rejected, retrying as plain text");
                self.post_message(&strip_tags(text), ParseMode::Plain).await
            }
            other => other,
        }
    }

    async fn post_message(&self, text: &str, mode: ParseMode) -> NotificationResult<()> {
        let mut params = serde_json::json!({
            "chat_id": self.chat_id_value(),
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(parse_mode) = mode.as_api_value() {
            params["parse_mode"] = serde_json::Value::from(parse_mode);
        }

        debug!(chat_id = %self.config.chat_id, ?mode, "Sending Telegram message");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&params)
            .send()
            .await?;
        Self::read_response::<serde_json::Value>(response).await?;

        info!("Telegram message sent successfully");
        Ok(())
    }

    /// PNG 이미지를 multipart로 업로드합니다.
    pub async fn send_photo(&self, png: Vec<u8>, caption: &str) -> NotificationResult<()> {
        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")?;
        let mut form = Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .part("photo", photo);
        if !caption.is_empty() {
            form = form.text("caption", caption.to_string());
        }

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::read_response::<serde_json::Value>(response).await?;

        info!("Telegram photo sent successfully");
        Ok(())
    }

    /// 상태 코드와 `ok` 필드를 확인하고 `result`를 꺼냅니다.
    async fn read_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> NotificationResult<Option<T>> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse<T>> = serde_json::from_str(&body).ok();

        // 요청 한도 제한 확인
        if status.as_u16() == 429 {
            let retry_after = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after)
                .unwrap_or(60);
            warn!(retry_after, "Telegram rate limited");
            return Err(NotificationError::RateLimited(retry_after));
        }

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(api.result),
            Some(api) => {
                let description = api.description.unwrap_or_default();
                error!(%status, %description, "Telegram API error");
                Err(NotificationError::SendFailed(format!(
                    "HTTP {}: {}",
                    status, description
                )))
            }
            None => {
                error!(%status, "Unexpected Telegram response: {}", body);
                Err(NotificationError::SendFailed(format!(
                    "HTTP {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramSender {
    async fn send_text(&self, text: &str, mode: ParseMode) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram delivery is disabled, skipping");
            return Ok(());
        }

        for chunk in chunk_message(text, MAX_MESSAGE_CHARS) {
            self.send_message(&chunk, mode).await?;
        }
        Ok(())
    }

    async fn send_image(&self, png: Vec<u8>, caption: &str) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram delivery is disabled, skipping");
            return Ok(());
        }
        self.send_photo(png, caption).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
            && !self.config.bot_token.expose_secret().is_empty()
            && !self.config.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
