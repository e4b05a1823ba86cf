//! 상관 엔진 -- 분류된 라인을 연결 상태 머신에 적용하고 방출을 결정합니다.
//!
//! 연결별 상태: Absent → Open/Idle → Open/InOperation → Open/Idle → … → Absent.
//!
//! 방출 규칙 (핵심 계약): 완료된 오퍼레이션마다 정확히 하나의 이벤트가
//! 방출됩니다 -- 같은 연결에 *다른* 오퍼레이션 번호가 도착해 이전 것을
//! 플러시하거나, *같은* 번호의 연속 라인이 요청 확장 컨트롤(SORT/VLV)이
//! 아니어서 현재 것을 플러시할 때. 다른 번호의 후속 라인을 받지 못한 채
//! 연결이 닫히면 그 오퍼레이션은 영원히 방출되지 않습니다.
//!
//! 처리 순서는 엄격하게 순차적입니다: 라인 하나가 완전히 처리된 뒤에야
//! 다음 라인을 읽습니다. 레지스트리는 이 단일 논리 스레드만 변경합니다.

use crate::classify::LinePatterns;
use crate::emit::EventSink;
use crate::registry::{ANONYMOUS_DN, ConnectionRegistry, ConnectionState};

/// 같은 오퍼레이션을 여러 라인에 걸쳐 확장하는 요청 컨트롤 키워드
///
/// 서버사이드 정렬(SORT)과 virtual list view(VLV)는 응답이 아니라
/// 요청의 연속이므로, 방출을 트리거하지 않습니다.
const REQUEST_CONTINUATIONS: &[&str] = &["SORT", "VLV"];

/// 라인 단위 상관 엔진
///
/// 패턴은 시작 시점에 한 번 컴파일되어 참조로 주입됩니다.
/// 싱크를 주입할 수 있어 단위 테스트가 쉽습니다.
pub struct CorrelationEngine<'a> {
    patterns: &'a LinePatterns,
    registry: ConnectionRegistry,
    lines_processed: u64,
    lines_skipped: u64,
    events_emitted: u64,
}

impl<'a> CorrelationEngine<'a> {
    /// 새 엔진을 생성합니다.
    pub fn new(patterns: &'a LinePatterns) -> Self {
        Self {
            patterns,
            registry: ConnectionRegistry::new(),
            lines_processed: 0,
            lines_skipped: 0,
            events_emitted: 0,
        }
    }

    /// 라인 하나를 처리합니다.
    ///
    /// envelope에 맞지 않는 라인과 추적되지 않는 연결의 라인은 조용히
    /// 건너뜁니다 (실제 로그의 정상 노이즈). 라인 처리 중에는 어떤
    /// 에러도 반환되지 않습니다.
    pub fn process_line(&mut self, line: &str, sink: &mut dyn EventSink) {
        self.lines_processed += 1;

        let Some(envelope) = self.patterns.envelope(line) else {
            self.lines_skipped += 1;
            return;
        };

        if let Some(open) = self.patterns.connection_open(envelope.event) {
            self.registry
                .open(ConnectionState::open(envelope.conn, envelope.time, &open));
            tracing::debug!(conn = envelope.conn, ssl = open.ssl, "connection opened");
            return;
        }

        if !self.registry.contains(envelope.conn) {
            // 처리 시작 전에 열린 연결 -- 버린다
            tracing::trace!(conn = envelope.conn, "line for untracked connection, skipping");
            self.lines_skipped += 1;
            return;
        }

        if let Some(cipher) = self.patterns.ssl_cipher(envelope.event)
            && let Some(state) = self.registry.get_mut(envelope.conn)
        {
            state.set_cipher(cipher.strength, cipher.cipher);
        }

        if let Some(op) = self.patterns.operation(envelope.event) {
            self.apply_operation(envelope.conn, envelope.time, envelope.event, &op, sink);
        }

        if self.patterns.is_closed(envelope.event) {
            self.registry.close(envelope.conn);
            tracing::debug!(conn = envelope.conn, "connection closed");
        }
    }

    fn apply_operation(
        &mut self,
        conn: u64,
        time: &str,
        event_text: &str,
        op: &crate::classify::Operation<'_>,
        sink: &mut dyn EventSink,
    ) {
        let Some(state) = self.registry.get_mut(conn) else {
            return;
        };

        if op.opnum != state.operation {
            // 다른 번호: 진행 중이던 오퍼레이션이 있으면 완료된 것
            if state.in_operation() {
                sink.emit(&state.to_event());
                self.events_emitted += 1;
            }

            if op.action == "BIND" {
                state.authenticated_dn = self
                    .patterns
                    .bind_dn(event_text)
                    .unwrap_or(ANONYMOUS_DN)
                    .to_owned();
            }

            state.begin_operation(op.opnum, time, op.action, op.fragment());
        } else if REQUEST_CONTINUATIONS.contains(&op.action) {
            // 페이징 정렬 / VLV 연속: 요청을 확장하고 열어 둔다
            state.requests.push(op.fragment());
        } else {
            // 같은 번호의 비연속 키워드: 이 오퍼레이션의 응답
            state.responses.push(op.fragment());
            sink.emit(&state.to_event());
            self.events_emitted += 1;
            state.finish_operation();
        }
    }

    /// 처리한 라인 수를 반환합니다.
    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }

    /// 건너뛴 라인 수를 반환합니다.
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// 방출한 이벤트 수를 반환합니다.
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// 현재 추적 중인 연결 수를 반환합니다.
    pub fn tracked_connections(&self) -> usize {
        self.registry.len()
    }
}
