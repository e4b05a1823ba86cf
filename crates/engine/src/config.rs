//! 상관 파이프라인 설정
//!
//! [`CorrelatorConfig`]는 출력 형식과 파일 소스 동작을 한 곳에 모읍니다.
//! 설정은 시작 시점에 한 번 검증되고, 이후에는 불변으로 취급됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use ldapsift_engine::config::CorrelatorConfigBuilder;
//! use ldapsift_engine::emit::OutputFormat;
//!
//! let config = CorrelatorConfigBuilder::new()
//!     .format(OutputFormat::Xml)
//!     .follow(true)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::emit::OutputFormat;
use crate::error::EngineError;

/// 상관 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatorConfig {
    /// 출력 형식 (json 또는 xml)
    pub format: OutputFormat,
    /// 파일 끝에 도달한 뒤에도 새 라인을 계속 기다릴지 여부
    pub follow: bool,
    /// follow 모드의 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 라인 하나의 최대 길이 (바이트, 초과분은 잘림)
    pub max_line_length: usize,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            follow: false,
            poll_interval_ms: 250,
            max_line_length: 65_536,
        }
    }
}

impl CorrelatorConfig {
    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        const MAX_POLL_INTERVAL_MS: u64 = 60_000; // 1 minute
        const MAX_LINE_LENGTH: usize = 1_048_576; // 1 MiB

        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(EngineError::Config {
                field: "poll_interval_ms".to_owned(),
                reason: format!("must be 1-{}", MAX_POLL_INTERVAL_MS),
            });
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH {
            return Err(EngineError::Config {
                field: "max_line_length".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_LENGTH),
            });
        }

        Ok(())
    }
}

/// 상관 설정 빌더
#[derive(Default)]
pub struct CorrelatorConfigBuilder {
    config: CorrelatorConfig,
}

impl CorrelatorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 출력 형식을 설정합니다.
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// follow 모드를 설정합니다.
    pub fn follow(mut self, follow: bool) -> Self {
        self.config.follow = follow;
        self
    }

    /// 폴링 간격(밀리초)을 설정합니다.
    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.config.poll_interval_ms = interval;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.config.max_line_length = length;
        self
    }

    /// 설정을 검증하고 `CorrelatorConfig`를 생성합니다.
    pub fn build(self) -> Result<CorrelatorConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
