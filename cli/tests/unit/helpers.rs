//! Shared test helpers: a recording remote channel and a capturing reporter.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;

use anyhow::Result;
use puppet_provision::application::ports::{
    OutputStream, ProgressReporter, RemoteChannel, RemoteProcess,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;

// ── Process constructors ─────────────────────────────────────────────────────

/// A process that has already finished: all output buffered, status reported.
pub fn finished_process(stdout: &[u8], stderr: &[u8], status: i32) -> RemoteProcess {
    let (tx, rx) = oneshot::channel();
    tx.send(Ok(status)).expect("receiver alive");
    RemoteProcess::new(
        Cursor::new(stdout.to_vec()),
        Cursor::new(stderr.to_vec()),
        rx,
    )
}

// ── Recording channel ────────────────────────────────────────────────────────

/// One interaction with the channel, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(String),
    Upload { path: String, contents: Vec<u8> },
}

/// Canned reaction to commands containing `pattern`.
struct Reply {
    pattern: String,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    status: i32,
}

/// Records every call. Commands succeed silently unless a reply or a start
/// failure matches; uploads succeed unless the path ends with a failing suffix.
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<Call>>,
    replies: Vec<Reply>,
    start_failure: Option<String>,
    upload_failure: Option<String>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `pattern` print the given output and exit with `status`.
    pub fn reply(mut self, pattern: &str, stdout: &[u8], stderr: &[u8], status: i32) -> Self {
        self.replies.push(Reply {
            pattern: pattern.to_string(),
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
            status,
        });
        self
    }

    /// Commands containing `pattern` cannot be started.
    pub fn fail_start(mut self, pattern: &str) -> Self {
        self.start_failure = Some(pattern.to_string());
        self
    }

    /// Uploads to paths ending with `suffix` fail.
    pub fn fail_upload(mut self, suffix: &str) -> Self {
        self.upload_failure = Some(suffix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(cmd) => Some(cmd),
                Call::Upload { .. } => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { path, contents } => Some((path, contents)),
                Call::Start(_) => None,
            })
            .collect()
    }
}

impl RemoteChannel for RecordingChannel {
    async fn start(&self, command: &str) -> Result<RemoteProcess> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::Start(command.to_string()));
        if let Some(pattern) = &self.start_failure {
            if command.contains(pattern.as_str()) {
                anyhow::bail!("connection reset by peer");
            }
        }
        let process = match self.replies.iter().find(|r| command.contains(&r.pattern)) {
            Some(r) => finished_process(&r.stdout, &r.stderr, r.status),
            None => finished_process(b"", b"", 0),
        };
        Ok(process)
    }

    async fn upload(
        &self,
        remote_path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let mut buf = Vec::new();
        contents.read_to_end(&mut buf).await?;
        self.calls.lock().expect("lock").push(Call::Upload {
            path: remote_path.to_string(),
            contents: buf,
        });
        if let Some(suffix) = &self.upload_failure {
            if remote_path.ends_with(suffix.as_str()) {
                anyhow::bail!("scp: write failed: no space left on device");
            }
        }
        Ok(())
    }
}

// ── Single-process channel ───────────────────────────────────────────────────

/// Hands out one prepared process, then refuses further commands.
pub struct OneShotChannel {
    process: Mutex<Option<RemoteProcess>>,
}

impl OneShotChannel {
    pub fn new(process: RemoteProcess) -> Self {
        Self {
            process: Mutex::new(Some(process)),
        }
    }
}

impl RemoteChannel for OneShotChannel {
    async fn start(&self, _: &str) -> Result<RemoteProcess> {
        self.process
            .lock()
            .expect("lock")
            .take()
            .ok_or_else(|| anyhow::anyhow!("process already started"))
    }

    async fn upload(&self, _: &str, _: &mut (dyn AsyncRead + Send + Unpin)) -> Result<()> {
        anyhow::bail!("upload not expected in this test")
    }
}

// ── Capturing reporter ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct CapturingReporter {
    steps: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    lines: Mutex<Vec<(OutputStream, String)>>,
}

impl CapturingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<String> {
        self.steps.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }

    pub fn lines(&self) -> Vec<(OutputStream, String)> {
        self.lines.lock().expect("lock").clone()
    }

    pub fn lines_of(&self, stream: OutputStream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, l)| l)
            .collect()
    }
}

impl ProgressReporter for CapturingReporter {
    fn step(&self, message: &str) {
        self.steps.lock().expect("lock").push(message.to_string());
    }
    fn success(&self, _: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }
    fn output(&self, stream: OutputStream, line: &str) {
        self.lines
            .lock()
            .expect("lock")
            .push((stream, line.to_string()));
    }
}
