//! 라인 분류기 -- 원시 로그 라인을 타입이 있는 필드로 분해합니다.
//!
//! 모든 매처는 무상태이며, [`LinePatterns`]는 시작 시점에 한 번 컴파일되어
//! 엔진에 참조로 전달됩니다. 바깥 envelope 매처가 타임스탬프와 연결 번호를
//! 추출하고, envelope 안의 이벤트 텍스트에 대해 나머지 매처가 각각
//! 독립적으로 시도됩니다. 한 라인이 여러 매처에 걸릴 수 있고, 아무 매처에도
//! 걸리지 않으면 그냥 건너뜁니다.
//!
//! # 라인 형식
//! ```text
//! [21/Apr/2009:11:39:55 -0700] conn=5 op=1 BIND dn="uid=admin"
//! ```

use regex::Regex;

use crate::error::EngineError;

/// envelope 매치 결과 -- 타임스탬프, 연결 번호, 내부 이벤트 텍스트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// 로그 타임스탬프 (원문 그대로)
    pub time: &'a str,
    /// 연결 번호
    pub conn: u64,
    /// 나머지 이벤트 텍스트
    pub event: &'a str,
}

/// connection-open 매치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOpen<'a> {
    /// SSL 연결 여부 (SSL 마커 존재 여부)
    pub ssl: bool,
    /// 클라이언트 주소
    pub client: &'a str,
    /// 서버 주소
    pub server: &'a str,
}

/// operation 매치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<'a> {
    /// 오퍼레이션 번호 (음수 가능)
    pub opnum: i64,
    /// 오퍼레이션 키워드 (BIND, SRCH, RESULT 등)
    pub action: &'a str,
    /// 키워드 뒤의 상세 텍스트 (없으면 빈 문자열)
    pub details: &'a str,
}

impl Operation<'_> {
    /// 요청/응답 시퀀스에 누적되는 조각 형태로 변환합니다.
    ///
    /// 키워드와 상세 텍스트를 그대로 이어 붙입니다 (상세 텍스트는
    /// 선행 공백을 포함한 로그 원문).
    pub fn fragment(&self) -> String {
        format!("{}{}", self.action, self.details)
    }
}

/// SSL cipher 매치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslCipher<'a> {
    /// 비트 강도
    pub strength: &'a str,
    /// 암호 스위트 이름
    pub cipher: &'a str,
}

/// 컴파일된 라인 패턴 집합
///
/// `new()`에서 전부 컴파일하며, 컴파일 실패는 프로그래밍 에러이므로
/// fail-fast로 [`EngineError::Pattern`]을 반환합니다.
pub struct LinePatterns {
    envelope: Regex,
    connection_open: Regex,
    operation: Regex,
    bind_dn: Regex,
    ssl_cipher: Regex,
}

impl LinePatterns {
    /// 내장 패턴을 컴파일합니다.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            envelope: Regex::new(r"^\[(?P<time>.*)\] conn=(?P<conn>\d+) (?P<event>.*)")?,
            connection_open: Regex::new(
                r"(?P<ssl>SSL )?connection from (?P<client>.+) to (?P<server>.+)",
            )?,
            operation: Regex::new(r"op=(?P<opnum>-?\d+) (?P<action>\w+)(?P<details>.+)?")?,
            bind_dn: Regex::new(r#"dn="(?P<dn>.+)""#)?,
            ssl_cipher: Regex::new(r"SSL (?P<strength>.*)-bit (?P<cipher>.*)")?,
        })
    }

    /// 바깥 envelope를 매치합니다. 실패하면 라인 전체가 무시 대상입니다.
    pub fn envelope<'a>(&self, line: &'a str) -> Option<Envelope<'a>> {
        let caps = self.envelope.captures(line)?;
        let time = caps.name("time").map_or("", |m| m.as_str());
        let event = caps.name("event").map_or("", |m| m.as_str());
        let conn = parse_number(caps.name("conn").map_or("", |m| m.as_str()), "conn");
        Some(Envelope { time, conn, event })
    }

    /// 이벤트 텍스트에서 connection-open을 매치합니다.
    pub fn connection_open<'a>(&self, event: &'a str) -> Option<ConnectionOpen<'a>> {
        let caps = self.connection_open.captures(event)?;
        Some(ConnectionOpen {
            ssl: caps.name("ssl").is_some(),
            client: caps.name("client").map_or("", |m| m.as_str()),
            server: caps.name("server").map_or("", |m| m.as_str()),
        })
    }

    /// 이벤트 텍스트에서 operation을 매치합니다.
    pub fn operation<'a>(&self, event: &'a str) -> Option<Operation<'a>> {
        let caps = self.operation.captures(event)?;
        let opnum = parse_number(caps.name("opnum").map_or("", |m| m.as_str()), "op");
        Some(Operation {
            opnum,
            action: caps.name("action").map_or("", |m| m.as_str()),
            details: caps.name("details").map_or("", |m| m.as_str()),
        })
    }

    /// 이벤트 텍스트에서 바인드 DN을 추출합니다.
    ///
    /// operation 매치 결과를 소비하거나 변경하지 않습니다 -- 같은 텍스트에
    /// 대해 독립적으로 평가됩니다.
    pub fn bind_dn<'a>(&self, event: &'a str) -> Option<&'a str> {
        self.bind_dn
            .captures(event)
            .and_then(|caps| caps.name("dn").map(|m| m.as_str()))
    }

    /// 연결 종료 라인인지 확인합니다 (양옆이 공백인 `closed` 토큰).
    pub fn is_closed(&self, event: &str) -> bool {
        event.contains(" closed ")
    }

    /// 이벤트 텍스트에서 SSL cipher 공지를 매치합니다.
    pub fn ssl_cipher<'a>(&self, event: &'a str) -> Option<SslCipher<'a>> {
        let caps = self.ssl_cipher.captures(event)?;
        Some(SslCipher {
            strength: caps.name("strength").map_or("", |m| m.as_str()),
            cipher: caps.name("cipher").map_or("", |m| m.as_str()),
        })
    }
}

/// 숫자 필드를 최선 노력으로 파싱합니다.
///
/// 파싱 실패는 복구 가능한 에러입니다: 운영자에게 보고하고 0으로
/// 대체한 뒤 계속 진행합니다.
fn parse_number<T>(text: &str, field: &str) -> T
where
    T: std::str::FromStr + Default,
{
    match text.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(field, text, "failed to parse numeric field, using fallback");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> LinePatterns {
        LinePatterns::new().expect("builtin patterns must compile")
    }

    #[test]
    fn builtin_patterns_compile() {
        assert!(LinePatterns::new().is_ok());
    }

    #[test]
    fn envelope_extracts_fields() {
        let p = patterns();
        let env = p
            .envelope("[21/Apr/2009:11:39:55 -0700] conn=5 op=1 BIND dn=\"uid=admin\"")
            .unwrap();
        assert_eq!(env.time, "21/Apr/2009:11:39:55 -0700");
        assert_eq!(env.conn, 5);
        assert_eq!(env.event, "op=1 BIND dn=\"uid=admin\"");
    }

    #[test]
    fn envelope_rejects_unrelated_lines() {
        let p = patterns();
        assert!(p.envelope("not an access log line").is_none());
        assert!(p.envelope("").is_none());
        assert!(p.envelope("conn=5 without brackets").is_none());
    }

    #[test]
    fn envelope_overflow_conn_falls_back_to_zero() {
        let p = patterns();
        // u64 범위를 넘는 숫자는 보고 후 0으로 대체
        let env = p
            .envelope("[21/Apr/2009:11:39:55 -0700] conn=99999999999999999999999 op=1 SRCH")
            .unwrap();
        assert_eq!(env.conn, 0);
    }

    #[test]
    fn connection_open_plain() {
        let p = patterns();
        let open = p
            .connection_open("fd=64 slot=64 connection from 10.0.0.1 to 10.0.0.2")
            .unwrap();
        assert!(!open.ssl);
        assert_eq!(open.client, "10.0.0.1");
        assert_eq!(open.server, "10.0.0.2");
    }

    #[test]
    fn connection_open_ssl_marker() {
        let p = patterns();
        let open = p
            .connection_open("fd=64 slot=64 SSL connection from 10.0.0.1 to 10.0.0.2")
            .unwrap();
        assert!(open.ssl);
        assert_eq!(open.client, "10.0.0.1");
    }

    #[test]
    fn connection_open_rejects_operation_lines() {
        let p = patterns();
        assert!(p.connection_open("op=1 SRCH base=\"dc=example\"").is_none());
    }

    #[test]
    fn operation_with_details() {
        let p = patterns();
        let op = p.operation("op=1 SRCH base=\"dc=example\" scope=2").unwrap();
        assert_eq!(op.opnum, 1);
        assert_eq!(op.action, "SRCH");
        assert_eq!(op.details, " base=\"dc=example\" scope=2");
        assert_eq!(op.fragment(), "SRCH base=\"dc=example\" scope=2");
    }

    #[test]
    fn operation_without_details() {
        let p = patterns();
        let op = p.operation("op=3 UNBIND").unwrap();
        assert_eq!(op.opnum, 3);
        assert_eq!(op.action, "UNBIND");
        assert_eq!(op.details, "");
        assert_eq!(op.fragment(), "UNBIND");
    }

    #[test]
    fn operation_negative_opnum() {
        let p = patterns();
        let op = p.operation("op=-1 fd=64 closed - B1").unwrap();
        assert_eq!(op.opnum, -1);
    }

    #[test]
    fn bind_dn_extraction() {
        let p = patterns();
        assert_eq!(
            p.bind_dn("op=1 BIND dn=\"uid=admin,dc=example\" method=128"),
            Some("uid=admin,dc=example"),
        );
    }

    #[test]
    fn bind_dn_absent_for_anonymous() {
        let p = patterns();
        assert!(p.bind_dn("op=1 BIND method=128 version=3").is_none());
    }

    #[test]
    fn closed_requires_surrounding_spaces() {
        let p = patterns();
        assert!(p.is_closed("op=-1 fd=64 closed - B1"));
        assert!(!p.is_closed("op=1 SRCH base=\"cn=closeddoor\""));
        assert!(!p.is_closed("op=-1 fd=64 closed"));
    }

    #[test]
    fn ssl_cipher_notice() {
        let p = patterns();
        let cipher = p.ssl_cipher("SSL 256-bit AES-256-GCM").unwrap();
        assert_eq!(cipher.strength, "256");
        assert_eq!(cipher.cipher, "AES-256-GCM");
    }

    #[test]
    fn ssl_cipher_absent_on_plain_lines() {
        let p = patterns();
        assert!(p.ssl_cipher("op=1 SRCH base=\"dc=example\"").is_none());
    }

    #[test]
    fn line_can_match_multiple_patterns() {
        // operation 매치와 bind DN 매치는 같은 텍스트에 대해 독립적
        let p = patterns();
        let event = "op=1 BIND dn=\"uid=admin\" method=128";
        assert!(p.operation(event).is_some());
        assert!(p.bind_dn(event).is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_lines_never_panic(line in ".{0,500}") {
                let p = patterns();
                if let Some(env) = p.envelope(&line) {
                    let _ = p.connection_open(env.event);
                    let _ = p.operation(env.event);
                    let _ = p.bind_dn(env.event);
                    let _ = p.is_closed(env.event);
                    let _ = p.ssl_cipher(env.event);
                }
            }

            #[test]
            fn valid_envelopes_always_match(conn in 0u64..1_000_000) {
                let p = patterns();
                let line = format!("[21/Apr/2009:11:39:55 -0700] conn={} op=1 SRCH", conn);
                let env = p.envelope(&line).expect("envelope should match");
                prop_assert_eq!(env.conn, conn);
            }
        }
    }
}
