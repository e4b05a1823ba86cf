#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`classify`]: 원시 로그 라인 분류 (정규식 기반, 무상태)
//! - [`registry`]: 연결별 진행 중 상태 보관 ([`ConnectionRegistry`])
//! - [`engine`]: 라인 단위 상태 머신과 방출 결정 ([`CorrelationEngine`])
//! - [`emit`]: 완성된 이벤트의 JSON/XML 직렬화 ([`EventSink`] 구현체)
//! - [`source`]: 파일 라인 소스 (bounded / follow 모드)
//! - [`event`]: 출력 이벤트 값 객체와 타임스탬프 헬퍼
//! - [`config`]: 엔진 설정
//! - [`error`]: 도메인 에러 타입

pub mod classify;
pub mod config;
pub mod emit;
pub mod engine;
pub mod error;
pub mod event;
pub mod registry;
pub mod source;

// --- 주요 타입 re-export ---

// 엔진
pub use engine::CorrelationEngine;

// 분류기
pub use classify::LinePatterns;

// 레지스트리
pub use registry::{ANONYMOUS_DN, ConnectionRegistry, ConnectionState, NO_OPERATION};

// 이벤트
pub use event::AccessEvent;

// 방출
pub use emit::{EventSink, FormatEmitter, OutputFormat};

// 소스
pub use source::{FileSource, RawLine, SourceConfig};

// 설정
pub use config::{CorrelatorConfig, CorrelatorConfigBuilder};

// 에러
pub use error::EngineError;
