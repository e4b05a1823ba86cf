//! 이벤트 방출 -- 완성된 이벤트를 JSON 또는 XML로 직렬화합니다.
//!
//! [`EventSink`]는 엔진과 출력 사이의 확장 포인트입니다. 직렬화 실패는
//! 해당 이벤트 하나를 버리고 경고를 남길 뿐, 스트림을 중단시키지
//! 않습니다 (로그 처리 견고성을 위한 의도된 트레이드오프).

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::event::AccessEvent;

/// 완성된 이벤트를 받는 싱크 trait
///
/// 새로운 출력 대상을 지원하려면 이 trait을 구현합니다.
pub trait EventSink {
    /// 완성된 이벤트 하나를 처리합니다.
    fn emit(&mut self, event: &AccessEvent);
}

/// 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 한 줄에 하나의 JSON 객체 (기본값)
    #[default]
    Json,
    /// 들여쓰기된 XML 레코드
    Xml,
}

/// 설정된 형식으로 이벤트를 직렬화해 writer에 기록하는 싱크
pub struct FormatEmitter<W: Write> {
    format: OutputFormat,
    writer: W,
}

impl<W: Write> FormatEmitter<W> {
    /// 새 방출기를 생성합니다.
    pub fn new(format: OutputFormat, writer: W) -> Self {
        Self { format, writer }
    }

    /// writer를 돌려받습니다 (테스트 및 플러시용).
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for FormatEmitter<W> {
    fn emit(&mut self, event: &AccessEvent) {
        let rendered = match self.format {
            OutputFormat::Json => render_json(event),
            OutputFormat::Xml => render_xml(event),
        };

        match rendered {
            Ok(record) => {
                if let Err(e) = writeln!(self.writer, "{record}") {
                    tracing::warn!(error = %e, %event, "failed to write event, dropping record");
                }
            }
            Err(reason) => {
                tracing::warn!(%reason, %event, "failed to serialize event, dropping record");
            }
        }
    }
}

fn render_json(event: &AccessEvent) -> Result<String, String> {
    serde_json::to_string(event).map_err(|e| e.to_string())
}

fn render_xml(event: &AccessEvent) -> Result<String, String> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', 4);
    XmlEvent::from(event)
        .serialize(serializer)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

// --- XML 뷰 ---
// JSON과 XML의 필드명이 다르므로 (time vs DateTime 등) XML 전용 뷰를
// 둡니다. 원본 이벤트를 빌려 추가 할당 없이 직렬화합니다.

#[derive(Serialize)]
#[serde(rename = "Event")]
struct XmlEvent<'a> {
    #[serde(rename = "DateTime")]
    time: &'a str,
    #[serde(rename = "Client")]
    client: &'a str,
    #[serde(rename = "Server")]
    server: &'a str,
    #[serde(rename = "Connection")]
    connection: u64,
    #[serde(rename = "SSL")]
    ssl: bool,
    #[serde(rename = "SSLCipher", skip_serializing_if = "str_empty")]
    ssl_cipher: &'a str,
    #[serde(rename = "SSLStrength", skip_serializing_if = "str_empty")]
    ssl_strength: &'a str,
    #[serde(rename = "Operation")]
    operation: i64,
    #[serde(rename = "AuthenticatedDN", skip_serializing_if = "str_empty")]
    authenticated_dn: &'a str,
    #[serde(rename = "Action")]
    action: &'a str,
    #[serde(rename = "Requests")]
    requests: XmlRequests<'a>,
    #[serde(rename = "Responses")]
    responses: XmlResponses<'a>,
    #[serde(rename = "Duration", skip_serializing_if = "duration_unset")]
    duration: i64,
}

#[derive(Serialize)]
struct XmlRequests<'a> {
    #[serde(rename = "Request")]
    items: &'a [String],
}

#[derive(Serialize)]
struct XmlResponses<'a> {
    #[serde(rename = "Response")]
    items: &'a [String],
}

fn str_empty(value: &&str) -> bool {
    value.is_empty()
}

fn duration_unset(duration: &i64) -> bool {
    *duration == 0
}

impl<'a> From<&'a AccessEvent> for XmlEvent<'a> {
    fn from(event: &'a AccessEvent) -> Self {
        Self {
            time: &event.time,
            client: &event.client,
            server: &event.server,
            connection: event.connection,
            ssl: event.ssl,
            ssl_cipher: &event.ssl_cipher,
            ssl_strength: &event.ssl_strength,
            operation: event.operation,
            authenticated_dn: &event.authenticated_dn,
            action: &event.action,
            requests: XmlRequests {
                items: &event.requests,
            },
            responses: XmlResponses {
                items: &event.responses,
            },
            duration: event.duration,
        }
    }
}
