//! 연결 레지스트리 -- 열린 연결마다 조립 중인 이벤트 상태를 보관합니다.
//!
//! [`ConnectionState`]는 connection-open 매치 시 생성되고, 라인 단위로
//! 변경되다가 connection-closed 매치 시 제거됩니다. 상태 간 참조 사이클이
//! 없으므로 연결 번호를 키로 하는 단순한 소유 맵이면 충분합니다.

use std::collections::HashMap;

use crate::classify::ConnectionOpen;
use crate::event::AccessEvent;

/// "진행 중인 오퍼레이션 없음" 센티널 (로그에 존재할 수 없는 번호)
pub const NO_OPERATION: i64 = -2;

/// 익명 바인드에 기록되는 DN 센티널
pub const ANONYMOUS_DN: &str = "__anonymous__";

/// 열린 연결 하나의 조립 중 상태
///
/// 레지스트리가 배타적으로 소유합니다. 오퍼레이션 필드는 방출 시점마다
/// [`ConnectionState::finish_operation`]으로 초기화됩니다.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    /// 연결 번호
    pub connection: u64,
    /// 클라이언트 주소
    pub client: String,
    /// 서버 주소
    pub server: String,
    /// SSL 연결 여부
    pub ssl: bool,
    /// SSL 암호 스위트 (모르면 빈 문자열)
    pub ssl_cipher: String,
    /// SSL 비트 강도 (모르면 빈 문자열)
    pub ssl_strength: String,
    /// 인증된 DN (첫 바인드에서 설정, 없으면 빈 문자열)
    pub authenticated_dn: String,
    /// 연결이 열린 타임스탬프
    pub conn_time: String,
    /// 진행 중인 오퍼레이션 번호 ([`NO_OPERATION`]이면 없음)
    pub operation: i64,
    /// 진행 중인 오퍼레이션의 시작 타임스탬프
    pub op_time: String,
    /// 진행 중인 오퍼레이션의 키워드
    pub action: String,
    /// 누적된 요청 조각
    pub requests: Vec<String>,
    /// 누적된 응답 조각
    pub responses: Vec<String>,
}

impl ConnectionState {
    /// connection-open 매치로부터 새 상태를 생성합니다.
    ///
    /// 오퍼레이션 필드는 비어 있고 번호는 센티널입니다.
    pub fn open(connection: u64, time: &str, open: &ConnectionOpen<'_>) -> Self {
        Self {
            connection,
            client: open.client.to_owned(),
            server: open.server.to_owned(),
            ssl: open.ssl,
            ssl_cipher: String::new(),
            ssl_strength: String::new(),
            authenticated_dn: String::new(),
            conn_time: time.to_owned(),
            operation: NO_OPERATION,
            op_time: String::new(),
            action: String::new(),
            requests: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// 진행 중인 오퍼레이션이 있는지 확인합니다.
    pub fn in_operation(&self) -> bool {
        self.operation != NO_OPERATION
    }

    /// 새 오퍼레이션을 시작합니다.
    ///
    /// 누적기를 비우고 번호/키워드/시작 시각을 현재 라인 값으로 설정한 뒤
    /// 첫 요청 조각을 추가합니다.
    pub fn begin_operation(&mut self, opnum: i64, time: &str, action: &str, first_request: String) {
        self.operation = opnum;
        self.op_time = time.to_owned();
        self.action = action.to_owned();
        self.requests = vec![first_request];
        self.responses = Vec::new();
    }

    /// 오퍼레이션 상태를 유휴(idle)로 되돌립니다.
    ///
    /// 방출 직후 호출되어, 다음 라인을 받기 전에 센티널로 복귀합니다.
    pub fn finish_operation(&mut self) {
        self.operation = NO_OPERATION;
    }

    /// SSL cipher 공지로 암호 필드를 갱신합니다. 오퍼레이션 상태는
    /// 건드리지 않습니다.
    pub fn set_cipher(&mut self, strength: &str, cipher: &str) {
        self.ssl_strength = strength.to_owned();
        self.ssl_cipher = cipher.to_owned();
    }

    /// 현재 누적 상태로부터 방출용 이벤트를 생성합니다.
    pub fn to_event(&self) -> AccessEvent {
        AccessEvent {
            time: self.op_time.clone(),
            client: self.client.clone(),
            server: self.server.clone(),
            connection: self.connection,
            ssl: self.ssl,
            ssl_cipher: self.ssl_cipher.clone(),
            ssl_strength: self.ssl_strength.clone(),
            operation: self.operation,
            authenticated_dn: self.authenticated_dn.clone(),
            action: self.action.clone(),
            requests: self.requests.clone(),
            responses: self.responses.clone(),
            duration: 0,
        }
    }
}

/// 연결 번호 → 조립 중 상태의 소유 맵
///
/// connection-open마다 하나 늘고 connection-closed마다 하나 줄어듭니다.
/// close 라인이 관측되지 않은 연결은 프로세스 수명 동안 남습니다
/// (TTL 없음, 수용된 트레이드오프).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<u64, ConnectionState>,
}

impl ConnectionRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 연결을 등록합니다. 같은 번호가 이미 추적 중이면 이전 상태를
    /// 방출 없이 덮어씁니다 (정상 로그에서는 나타나지 않는 에지 케이스).
    pub fn open(&mut self, state: ConnectionState) {
        if self.connections.contains_key(&state.connection) {
            tracing::debug!(
                conn = state.connection,
                "connection reopened while tracked, discarding previous state"
            );
        }
        self.connections.insert(state.connection, state);
    }

    /// 추적 중인 연결의 상태를 빌립니다.
    pub fn get_mut(&mut self, conn: u64) -> Option<&mut ConnectionState> {
        self.connections.get_mut(&conn)
    }

    /// 연결이 추적 중인지 확인합니다.
    pub fn contains(&self, conn: u64) -> bool {
        self.connections.contains_key(&conn)
    }

    /// 연결을 레지스트리에서 제거합니다.
    ///
    /// 진행 중이던 오퍼레이션은 방출 없이 버려집니다.
    pub fn close(&mut self, conn: u64) -> Option<ConnectionState> {
        self.connections.remove(&conn)
    }

    /// 추적 중인 연결 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// 추적 중인 연결이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
