//! 상관 엔진 에러 타입
//!
//! [`EngineError`]는 초기화와 라인 소스에서 발생하는 치명적 에러를 표현합니다.
//! 라인 단위의 복구 가능한 문제(숫자 파싱 실패 등)는 에러로 반환하지 않고
//! 로깅 후 계속 진행합니다 — 스트림 처리 중에는 어떤 에러도 엔진 경계를
//! 넘지 않습니다.

/// 상관 엔진 도메인 에러
///
/// 패턴 컴파일, 소스 열기, 설정 검증 등 셋업 단계의 에러만 포함합니다.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 내장 패턴 컴파일 실패 (프로그래밍 에러, 시작 시점에 fail-fast)
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// 로그 파일 열기/추적 실패
    #[error("source error: {path}: {reason}")]
    Source {
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러 (소스 태스크가 예기치 않게 종료됨)
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
