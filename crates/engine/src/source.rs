//! 파일 라인 소스
//!
//! 액세스 로그 파일을 열어 라인 단위로 채널에 흘려보냅니다.
//! follow 모드에서는 `tail -f`와 유사하게 파일 끝 이후의 새 라인을
//! 기다리며, 로테이션을 자동 감지합니다.
//!
//! # 로테이션 감지
//! - inode 변경 감지 (logrotate 등, Unix 전용)
//! - 파일 크기 축소 감지 (truncation)
//! - 새 파일 자동 열기 (처음부터 다시 읽음)

use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use crate::config::CorrelatorConfig;
use crate::error::EngineError;

/// 소스가 채널로 내보내는 원시 라인
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 줄바꿈이 제거된 라인 본문
    pub text: String,
    /// 파일 내 라인 번호 (1부터 시작, 로테이션 시에도 계속 증가)
    pub number: u64,
}

/// 파일 소스 설정
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// 파일 끝에 도달한 뒤에도 새 라인을 계속 기다릴지 여부
    pub follow: bool,
    /// follow 모드의 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 최대 라인 길이 (바이트, 초과분은 잘림)
    pub max_line_length: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            follow: false,
            poll_interval_ms: 250,
            max_line_length: 65_536,
        }
    }
}

impl From<&CorrelatorConfig> for SourceConfig {
    fn from(config: &CorrelatorConfig) -> Self {
        Self {
            follow: config.follow,
            poll_interval_ms: config.poll_interval_ms,
            max_line_length: config.max_line_length,
        }
    }
}

/// 파일 기반 라인 소스
///
/// `tokio::spawn`으로 별도 태스크에서 [`FileSource::run`]을 호출하세요.
/// 수신자가 채널을 닫으면 조용히 종료됩니다.
pub struct FileSource {
    path: PathBuf,
    config: SourceConfig,
    tx: mpsc::Sender<RawLine>,
    line_number: u64,
}

impl FileSource {
    /// 새 파일 소스를 생성합니다.
    pub fn new(path: PathBuf, config: SourceConfig, tx: mpsc::Sender<RawLine>) -> Self {
        Self {
            path,
            config,
            tx,
            line_number: 0,
        }
    }

    /// 소스를 실행합니다.
    ///
    /// 파일을 열 수 없으면 [`EngineError::Source`]를 반환합니다 (치명적).
    /// 열린 뒤의 읽기 실패는 로테이션으로 간주하고 재시도합니다.
    pub async fn run(mut self) -> Result<(), EngineError> {
        let mut file = self.open().await?;
        let mut inode = self.current_inode().await;
        let mut offset: u64 = 0;
        // 아직 줄바꿈을 못 본 꼬리 바이트
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let receiver_alive = self
                .drain_to_eof(&mut file, &mut offset, &mut pending)
                .await?;
            if !receiver_alive {
                tracing::debug!(path = %self.path.display(), "receiver dropped, stopping source");
                return Ok(());
            }

            if !self.config.follow {
                // EOF에서 줄바꿈 없이 끝난 마지막 라인도 하나의 라인
                if !pending.is_empty() {
                    let tail = std::mem::take(&mut pending);
                    self.send_line(&tail).await;
                }
                tracing::debug!(
                    path = %self.path.display(),
                    lines = self.line_number,
                    "reached end of file"
                );
                return Ok(());
            }

            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;

            // 새 라인이 없어도 수신자 종료는 감지해야 한다
            if self.tx.is_closed() {
                tracing::debug!(path = %self.path.display(), "receiver dropped, stopping source");
                return Ok(());
            }

            if self.rotated(offset, inode).await {
                tracing::info!(path = %self.path.display(), "file rotated, reopening");
                file = self.open().await?;
                inode = self.current_inode().await;
                offset = 0;
                pending.clear();
            }
        }
    }

    /// 현재 위치부터 EOF까지 읽어 완성된 라인을 전부 보냅니다.
    ///
    /// 수신자가 살아 있으면 `true`를 반환합니다.
    async fn drain_to_eof(
        &mut self,
        file: &mut File,
        offset: &mut u64,
        pending: &mut Vec<u8>,
    ) -> Result<bool, EngineError> {
        let mut buf = [0u8; 8192];
        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                return Ok(true);
            }
            *offset += read as u64;
            pending.extend_from_slice(&buf[..read]);

            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                if !self.send_line(&line[..newline]).await {
                    return Ok(false);
                }
            }
        }
    }

    /// 라인 하나를 채널로 보냅니다. 수신자가 살아 있으면 `true`.
    async fn send_line(&mut self, raw: &[u8]) -> bool {
        let mut text = String::from_utf8_lossy(raw).into_owned();
        if text.ends_with('\r') {
            text.pop();
        }
        if text.len() > self.config.max_line_length {
            tracing::warn!(
                length = text.len(),
                limit = self.config.max_line_length,
                "line exceeds maximum length, truncating"
            );
            let mut cut = self.config.max_line_length;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }

        self.line_number += 1;
        self.tx
            .send(RawLine {
                text,
                number: self.line_number,
            })
            .await
            .is_ok()
    }

    async fn open(&self) -> Result<File, EngineError> {
        File::open(&self.path)
            .await
            .map_err(|e| EngineError::Source {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    #[cfg(unix)]
    async fn current_inode(&self) -> Option<u64> {
        use std::os::unix::fs::MetadataExt;
        tokio::fs::metadata(&self.path).await.ok().map(|m| m.ino())
    }

    #[cfg(not(unix))]
    async fn current_inode(&self) -> Option<u64> {
        None
    }

    /// 파일이 로테이션되었는지 확인합니다.
    async fn rotated(&self, offset: u64, inode: Option<u64>) -> bool {
        let Ok(metadata) = tokio::fs::metadata(&self.path).await else {
            // 파일이 잠시 사라진 상태 (로테이션 중) -- 다음 폴에서 재확인
            return false;
        };

        if metadata.len() < offset {
            return true;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if let Some(old) = inode
                && metadata.ino() != old
            {
                return true;
            }
        }

        false
    }
}
