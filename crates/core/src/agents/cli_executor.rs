//! Subprocess executor for command-backed agents.
//!
//! Spawns a command, writes an optional request payload to its stdin and
//! parses stdout as JSON Lines / NDJSON.

use crate::agents::base::AgentError;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

pub struct CliExecutor;

impl CliExecutor {
    /// Execute a command and parse its stdout as JSON Lines.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to execute
    /// * `args` - Command line arguments
    /// * `working_dir` - Working directory for the command
    /// * `stdin_payload` - Written to stdin, then closed, while stdout is read
    ///
    /// # Returns
    ///
    /// A stream of `serde_json::Value` objects, one per line of JSON output.
    /// Empty lines are skipped. Lines that fail to parse yield
    /// `AgentError::ResponseParse`. A non-zero exit status yields a final
    /// `AgentError::ExecutionError` carrying stderr.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pc_core::agents::cli_executor::CliExecutor;
    /// use tokio_stream::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let stream = CliExecutor::execute(
    ///         "echo".to_string(),
    ///         vec![r#"{"type":"test"}"#.to_string()],
    ///         ".".to_string(),
    ///         None,
    ///     );
    ///
    ///     let values: Vec<_> = stream.collect().await;
    ///     println!("Got {} values", values.len());
    /// }
    /// ```
    pub fn execute(
        command: String,
        args: Vec<String>,
        working_dir: String,
        stdin_payload: Option<String>,
    ) -> Pin<Box<dyn Stream<Item = Result<serde_json::Value, AgentError>> + Send>> {
        let stream = async_stream::stream! {
            let mut cmd = Command::new(&command);
            cmd.args(&args);
            cmd.current_dir(&working_dir);
            cmd.stdin(if stdin_payload.is_some() { Stdio::piped() } else { Stdio::null() });
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
            cmd.kill_on_drop(true);

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    yield Err(AgentError::ExecutionError(format!(
                        "Failed to spawn command '{}': {}",
                        command, e
                    )));
                    return;
                }
            };

            // stdin and stderr run on their own tasks while stdout is read.
            let stdin_writer = match (stdin_payload, child.stdin.take()) {
                (Some(payload), Some(mut stdin)) => Some(tokio::spawn(async move {
                    let written = stdin.write_all(payload.as_bytes()).await;
                    // Closing stdin signals end of request.
                    drop(stdin);
                    written
                })),
                _ => None,
            };

            let stderr_reader = child.stderr.take().map(|mut stderr| {
                tokio::spawn(async move {
                    let mut text = String::new();
                    let _ = stderr.read_to_string(&mut text).await;
                    text
                })
            });

            let stdout = match child.stdout.take() {
                Some(stdout) => stdout,
                None => {
                    yield Err(AgentError::ExecutionError(
                        "Failed to capture stdout".to_string()
                    ));
                    return;
                }
            };

            let mut lines = BufReader::new(stdout).lines();

            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<serde_json::Value>(&line) {
                    Ok(value) => yield Ok(value),
                    Err(e) => {
                        yield Err(AgentError::ResponseParse(format!(
                            "Failed to parse JSON: {} (line: {})",
                            e, line
                        )));
                    }
                }
            }

            let stderr_text = match stderr_reader {
                Some(reader) => reader.await.unwrap_or_default(),
                None => String::new(),
            };

            let write_error = match stdin_writer {
                Some(writer) => match writer.await {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(e) => Some(e.to_string()),
                },
                None => None,
            };

            match child.wait().await {
                Ok(status) if status.success() => {
                    if let Some(e) = write_error {
                        yield Err(AgentError::ExecutionError(format!(
                            "Failed to write request to '{}': {}",
                            command, e
                        )));
                    }
                }
                Ok(status) => {
                    yield Err(AgentError::ExecutionError(format!(
                        "Command '{}' exited with {}: {}",
                        command,
                        status,
                        stderr_text.trim()
                    )));
                }
                Err(e) => {
                    yield Err(AgentError::ExecutionError(format!(
                        "Failed to wait for '{}': {}",
                        command, e
                    )));
                }
            }
        };

        Box::pin(stream)
    }

    /// Run a command to completion and return its last JSON line.
    ///
    /// Earlier lines are treated as progress output and discarded; any
    /// parse or exit error fails the call.
    pub async fn last_value(
        command: String,
        args: Vec<String>,
        working_dir: String,
        stdin_payload: Option<String>,
    ) -> Result<serde_json::Value, AgentError> {
        let mut stream = Self::execute(command.clone(), args, working_dir, stdin_payload);
        let mut last = None;

        while let Some(item) = stream.next().await {
            last = Some(item?);
        }

        last.ok_or_else(|| {
            AgentError::ResponseParse(format!("Command '{}' produced no JSON output", command))
        })
    }
}
