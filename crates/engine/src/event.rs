//! 출력 이벤트 값 객체와 타임스탬프 헬퍼
//!
//! [`AccessEvent`]는 하나의 완료된 요청/응답 쌍을 표현합니다. 엔진이
//! 방출 시점에 생성하며, 생성 이후에는 변경되지 않습니다. JSON 필드명은
//! 출력 스키마에 맞춰 고정되어 있습니다 (serde rename).

use std::fmt;

use chrono::DateTime;
use serde::Serialize;

/// 액세스 로그 타임스탬프 형식
///
/// 예: `21/Apr/2009:11:39:55 -0700`
pub const TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 완료된 오퍼레이션 하나를 담는 출력 이벤트
///
/// 필드명과 생략 규칙은 출력 스키마와 1:1로 대응합니다.
/// 빈 문자열인 선택 필드(sslcipher, sslstrength, authenticateddn)와
/// 0인 duration은 직렬화에서 생략됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessEvent {
    /// 오퍼레이션 시작 타임스탬프 (로그 원문 그대로)
    pub time: String,
    /// 클라이언트 주소
    pub client: String,
    /// 서버 주소
    pub server: String,
    /// 연결 번호
    pub connection: u64,
    /// SSL 연결 여부
    pub ssl: bool,
    /// SSL 암호 스위트 (알 수 없으면 생략)
    #[serde(rename = "sslcipher", skip_serializing_if = "String::is_empty")]
    pub ssl_cipher: String,
    /// SSL 비트 강도 (알 수 없으면 생략)
    #[serde(rename = "sslstrength", skip_serializing_if = "String::is_empty")]
    pub ssl_strength: String,
    /// 오퍼레이션 번호
    pub operation: i64,
    /// 인증된 DN (바인드하지 않았으면 생략)
    #[serde(rename = "authenticateddn", skip_serializing_if = "String::is_empty")]
    pub authenticated_dn: String,
    /// 오퍼레이션 키워드 (BIND, SRCH 등)
    pub action: String,
    /// 요청 조각 (로그 라인 순서)
    pub requests: Vec<String>,
    /// 응답 조각 (로그 라인 순서)
    pub responses: Vec<String>,
    /// 소요 시간(초). 현재 상관 로직은 채우지 않으므로 항상 생략됩니다.
    #[serde(skip_serializing_if = "duration_unset")]
    pub duration: i64,
}

fn duration_unset(duration: &i64) -> bool {
    *duration == 0
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AccessEvent conn={} op={} action={} requests={} responses={}",
            self.connection,
            self.operation,
            self.action,
            self.requests.len(),
            self.responses.len(),
        )
    }
}

/// 두 액세스 로그 타임스탬프 사이의 초 단위 차이를 계산합니다.
///
/// 어느 한쪽이라도 [`TIME_FORMAT`]으로 파싱되지 않으면 `-1`을 반환합니다.
pub fn duration_between(start: &str, end: &str) -> i64 {
    let start = match DateTime::parse_from_str(start, TIME_FORMAT) {
        Ok(t) => t,
        Err(_) => return -1,
    };
    let end = match DateTime::parse_from_str(end, TIME_FORMAT) {
        Ok(t) => t,
        Err(_) => return -1,
    };
    (end - start).num_seconds()
}
