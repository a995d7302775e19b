use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::analysis::classify::classify_failure;
use crate::analysis::output::parse_analysis_output;
use crate::analysis::{AnalysisError, Analyzer};
use crate::config::Config;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Runs the external analysis script once per request:
/// `<program> <leading args...> <document path>`.
#[derive(Debug, Clone)]
pub struct ScriptAnalyzer {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl ScriptAnalyzer {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.analyzer_program.clone(),
            config.analyzer_script.iter().cloned().collect(),
            config.analysis_timeout,
        )
    }

    fn command(&self, document: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(document)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

struct Finished {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

#[async_trait]
impl Analyzer for ScriptAnalyzer {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        info!("Processing file: {}", request.path().display());

        let mut child = self.command(request.path()).spawn().map_err(|e| {
            error!("Failed to spawn analyzer '{}': {e}", self.program);
            AnalysisError::Io(e)
        })?;

        let stdout_task = child.stdout.take().map(|out| tokio::spawn(drain(out, Stream::Stdout)));
        let stderr_task = child.stderr.take().map(|err| tokio::spawn(drain(err, Stream::Stderr)));
        let abort_handles: Vec<_> = [&stdout_task, &stderr_task]
            .into_iter()
            .flatten()
            .map(JoinHandle::abort_handle)
            .collect();

        // Exit and timeout are exclusive: whichever resolves first decides the outcome,
        // and the other is never observed.
        let outcome = timeout(
            self.timeout,
            wait_and_collect(&mut child, stdout_task, stderr_task),
        )
        .await;

        let finished = match outcome {
            Ok(finished) => finished?,
            Err(_) => {
                warn!(
                    "Analyzer exceeded {:?}; killing process {:?}",
                    self.timeout,
                    child.id()
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill analyzer process: {e}");
                }
                for handle in abort_handles {
                    handle.abort();
                }
                return Err(AnalysisError::Timeout(self.timeout));
            }
        };

        if !finished.status.success() {
            error!("Analyzer failed with code: {:?}", finished.status.code());
            error!("Error output: {}", finished.stderr);
            let err = classify_failure(finished.status.code(), &finished.stderr);
            warn!(kind = ?err.kind(), "Classified analyzer failure: {err}");
            return Err(err);
        }

        if !finished.stderr.trim().is_empty() {
            warn!("Analyzer exited cleanly but wrote to stderr: {}", finished.stderr);
        }
        info!("Raw analyzer output: {}", finished.stdout);

        parse_analysis_output(&finished.stdout).inspect_err(|e| {
            error!("Error parsing analysis results: {e}");
        })
    }
}

async fn wait_and_collect(
    child: &mut Child,
    stdout_task: Option<JoinHandle<Vec<u8>>>,
    stderr_task: Option<JoinHandle<Vec<u8>>>,
) -> Result<Finished, AnalysisError> {
    let status = child.wait().await?;
    Ok(Finished {
        status,
        stdout: collect(stdout_task, Stream::Stdout).await,
        stderr: collect(stderr_task, Stream::Stderr).await,
    })
}

async fn collect(task: Option<JoinHandle<Vec<u8>>>, stream: Stream) -> String {
    let Some(task) = task else {
        return String::new();
    };
    match task.await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(?stream, "Analyzer output reader stopped: {e}");
            String::new()
        }
    }
}

/// Accumulates a pipe until EOF, logging each chunk as it arrives.
async fn drain<R>(mut reader: R, stream: Stream) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = &buf[..n];
                match stream {
                    Stream::Stdout => {
                        info!("Analyzer output: {}", String::from_utf8_lossy(chunk))
                    }
                    Stream::Stderr => {
                        error!("Analyzer error: {}", String::from_utf8_lossy(chunk))
                    }
                }
                collected.extend_from_slice(chunk);
            }
            Err(e) => {
                warn!(?stream, "Failed to read analyzer output: {e}");
                break;
            }
        }
    }
    collected
}
