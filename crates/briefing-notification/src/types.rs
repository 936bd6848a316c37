//! 전송 타입 및 trait 정의.

use async_trait::async_trait;

/// 메시지 파싱 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// HTML 태그 해석
    #[default]
    Html,
    /// 일반 텍스트
    Plain,
}

impl ParseMode {
    /// Bot API `parse_mode` 값. 일반 텍스트는 필드를 생략합니다.
    pub fn as_api_value(&self) -> Option<&'static str> {
        match self {
            ParseMode::Html => Some("HTML"),
            ParseMode::Plain => None,
        }
    }
}

/// 전송 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 전송 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("메시지 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("이미지 생성 실패: {0}")]
    RenderFailed(String),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 채팅 전송 trait.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// 텍스트 메시지를 전송합니다. 긴 메시지는 나눠서 보냅니다.
    async fn send_text(&self, text: &str, mode: ParseMode) -> NotificationResult<()>;

    /// PNG 이미지를 캡션과 함께 전송합니다.
    async fn send_image(&self, png: Vec<u8>, caption: &str) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}
