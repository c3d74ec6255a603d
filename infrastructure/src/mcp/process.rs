//! Per-call tool process lifecycle.
//!
//! [`ToolProcess::exchange`] spawns one instance of the tool process, writes
//! a single request line, reads stdout until a response line or EOF while
//! draining stderr, and always terminates and reaps the child. The whole
//! exchange is bounded by one timeout.
//!
//! Cleanup is structural: the child lives in a [`ChildGuard`] whose `Drop`
//! kills it, so every early return and a cancelled future leave no process
//! behind.

use super::error::{McpError, Result};
use super::protocol::is_response_line;
use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Time allowed for stderr to reach EOF once the child is gone.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// What one exchange captured from the tool process.
#[derive(Debug, Clone)]
pub struct RawOutput {
    /// stdout up to and including the response line
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated after responding
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

/// How to launch the tool process.
#[derive(Debug, Clone)]
pub struct ToolProcess {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    timeout: Duration,
}

impl ToolProcess {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            env: HashMap::new(),
            timeout,
        }
    }

    /// Extra environment variables; the parent environment is inherited.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one request/response exchange.
    pub async fn exchange(&self, request_line: &str) -> Result<RawOutput> {
        let started = Instant::now();
        let mut guard = self.spawn()?;
        debug!("Spawned tool process: {} (pid {:?})", self.command_line(), guard.id());

        let outcome = tokio::time::timeout(self.timeout, converse(&mut guard, request_line)).await;
        match outcome {
            Ok(Ok(mut raw)) => {
                raw.duration = started.elapsed();
                Ok(raw)
            }
            Ok(Err(e)) => {
                guard.terminate().await;
                Err(e)
            }
            Err(_) => {
                warn!(
                    "Tool process did not respond within {:?}, terminating",
                    self.timeout
                );
                guard.terminate().await;
                Err(McpError::Timeout(self.timeout))
            }
        }
    }

    fn spawn(&self) -> Result<ChildGuard> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|source| McpError::SpawnError {
            command: self.command_line(),
            source,
        })?;
        Ok(ChildGuard::new(child))
    }
}

/// Write the request, then read until a response line or EOF.
async fn converse(guard: &mut ChildGuard, request_line: &str) -> Result<RawOutput> {
    let child = guard.child_mut();
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stderr_task = stderr.map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let mut stdin = stdin.ok_or_else(|| {
        McpError::WriteError(std::io::Error::other("tool process stdin not captured"))
    })?;
    stdin
        .write_all(request_line.as_bytes())
        .await
        .map_err(McpError::WriteError)?;
    stdin.flush().await.map_err(McpError::WriteError)?;
    // Closing stdin tells the process no further requests follow.
    drop(stdin);

    let stdout = stdout.ok_or_else(|| {
        McpError::ReadError(std::io::Error::other("tool process stdout not captured"))
    })?;
    let mut lines = BufReader::new(stdout).lines();
    let mut captured = String::new();
    let mut responded = false;
    while let Some(line) = lines.next_line().await.map_err(McpError::ReadError)? {
        trace!("tool stdout: {}", line);
        captured.push_str(&line);
        captured.push('\n');
        if is_response_line(&line) {
            responded = true;
            break;
        }
    }

    let exit_code = if responded {
        // The process may keep serving; one response is all we need.
        guard.terminate().await.and_then(|status| status.code())
    } else {
        let status = guard.wait().await.map_err(McpError::ReadError)?;
        status.code()
    };
    let stderr = collect_stderr(stderr_task).await;

    if !responded {
        if exit_code != Some(0) {
            return Err(McpError::ProcessExited {
                code: exit_code,
                stderr: stderr.trim().to_string(),
            });
        }
        if captured.trim().is_empty() {
            return Err(McpError::EmptyOutput {
                stderr: stderr.trim().to_string(),
            });
        }
    }

    Ok(RawOutput {
        stdout: captured,
        stderr,
        exit_code,
        duration: Duration::ZERO,
    })
}

async fn collect_stderr(task: Option<JoinHandle<String>>) -> String {
    let Some(task) = task else {
        return String::new();
    };
    match tokio::time::timeout(STDERR_GRACE, task).await {
        Ok(Ok(stderr)) => stderr,
        Ok(Err(e)) => {
            debug!("stderr reader failed: {}", e);
            String::new()
        }
        // A grandchild may still hold the pipe open.
        Err(_) => String::new(),
    }
}

/// Owns the spawned child; kills it on drop unless it was already reaped.
pub struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Wait for the child to exit on its own.
    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.reaped = true;
        Ok(status)
    }

    /// Kill the child if still running and reap it.
    async fn terminate(&mut self) -> Option<ExitStatus> {
        if self.reaped {
            return None;
        }
        if let Ok(Some(status)) = self.child.try_wait() {
            self.reaped = true;
            return Some(status);
        }
        if let Err(e) = self.child.start_kill() {
            debug!("Failed to kill tool process: {}", e);
        }
        match self.child.wait().await {
            Ok(status) => {
                self.reaped = true;
                Some(status)
            }
            Err(e) => {
                warn!("Failed to reap tool process: {}", e);
                None
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            debug!("ChildGuard dropping, killing tool process");
            let _ = self.child.start_kill();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;

    fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> ToolProcess {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        ToolProcess::new(
            "sh",
            vec![path.to_string_lossy().into_owned()],
            Duration::from_secs(5),
        )
    }

    fn is_alive(pid: u32) -> bool {
        std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_reads_response_line() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(
            &dir,
            "echo.sh",
            r#"read -r line
echo "server starting" >&2
echo "Datadog MCP server running on stdio"
printf '{"jsonrpc":"2.0","id":"req-1","result":{"content":[]}}\n'"#,
        );

        let raw = process.exchange("{}\n").await.unwrap();
        assert!(raw.stdout.contains("running on stdio"));
        assert!(raw.stdout.contains("\"req-1\""));
        assert!(raw.stderr.contains("server starting"));
    }

    #[tokio::test]
    async fn test_stops_at_response_and_terminates_server() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let process = script(
            &dir,
            "serve.sh",
            &format!(
                r#"echo $$ > {}
read -r line
printf '{{"jsonrpc":"2.0","id":"req-1","result":{{}}}}\n'
exec sleep 30"#,
                pid_file.display()
            ),
        );

        let started = Instant::now();
        let raw = process.exchange("{}\n").await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(raw.stdout.contains("req-1"));

        let pid: u32 = std::fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        assert!(!is_alive(pid));
    }

    #[tokio::test]
    async fn test_timeout_terminates_process() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let body = format!("echo $$ > {}\nexec sleep 30", pid_file.display());
        let path = dir.path().join("hang.sh");
        std::fs::write(&path, body).unwrap();
        let process = ToolProcess::new(
            "sh",
            vec![path.to_string_lossy().into_owned()],
            Duration::from_millis(300),
        );

        let err = process.exchange("{}\n").await.unwrap_err();
        assert!(matches!(err, McpError::Timeout(_)));

        let pid: u32 = std::fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        assert!(!is_alive(pid));
    }

    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(
            &dir,
            "fail.sh",
            "read -r line\necho 'DD_API_KEY is not set' >&2\nexit 3",
        );

        match process.exchange("{}\n").await.unwrap_err() {
            McpError::ProcessExited { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "DD_API_KEY is not set");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_closed_stdin_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(&dir, "deaf.sh", "exec 0<&-\nsleep 1");

        // Larger than a pipe buffer, so the write cannot complete.
        let request = format!("{}\n", "x".repeat(1 << 20));
        let err = process.exchange(&request).await.unwrap_err();
        assert!(matches!(err, McpError::WriteError(_)), "{err}");
    }

    #[tokio::test]
    async fn test_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(&dir, "quiet.sh", "read -r line\nexit 0");

        let err = process.exchange("{}\n").await.unwrap_err();
        assert!(matches!(err, McpError::EmptyOutput { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_output_is_returned_raw() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(&dir, "garbage.sh", "read -r line\necho 'not json at all'");

        let raw = process.exchange("{}\n").await.unwrap();
        assert_eq!(raw.stdout.trim(), "not json at all");
        assert_eq!(raw.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let process = ToolProcess::new(
            "/nonexistent/tool-server",
            vec![],
            Duration::from_secs(1),
        );
        let err = process.exchange("{}\n").await.unwrap_err();
        assert!(matches!(err, McpError::SpawnError { .. }));
        assert!(err.to_string().contains("/nonexistent/tool-server"));
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let dir = tempfile::tempdir().unwrap();
        let process = script(
            &dir,
            "env.sh",
            r#"read -r line
printf '{"id":"req-1","result":{"key":"%s"}}\n' "$DD_SITE""#,
        )
        .with_env(HashMap::from([(
            "DD_SITE".to_string(),
            "datadoghq.eu".to_string(),
        )]));

        let raw = process.exchange("{}\n").await.unwrap();
        assert!(raw.stdout.contains("datadoghq.eu"));
    }
}
