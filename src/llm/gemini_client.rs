use crate::config::ClientConfig;
use crate::constants::*;
use crate::errors::{Error, Result};
use crate::llm::prompt::build_prompt;
use crate::llm::provider::LlmProvider;
use crate::llm::ChatMessage;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, info, warn};

/// Client that answers chat requests by running the Gemini CLI.
///
/// Holds only immutable settings, so one client can serve any number of
/// concurrent `generate` calls; each call runs its own subprocess.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    executable: String,
    timeout: Duration,
    model: String,
    attachment_dir: PathBuf,
    prompt_via_stdin: bool,
    sandbox: bool,
    extra_args: Vec<String>,
}

impl Default for GeminiClient {
    fn default() -> Self {
        GeminiClient::new(
            DEFAULT_EXECUTABLE,
            Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl GeminiClient {
    /// Creates a client for the given executable and timeout
    ///
    /// # Arguments
    /// * `executable` - Name or path of the Gemini CLI
    /// * `timeout` - Maximum run time of one invocation
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        GeminiClient {
            executable: executable.into(),
            timeout,
            model: DEFAULT_MODEL.to_string(),
            attachment_dir: PathBuf::from(DEFAULT_ATTACHMENT_DIR),
            prompt_via_stdin: false,
            sandbox: false,
            extra_args: Vec::new(),
        }
    }

    /// Creates a client from a configuration
    ///
    /// # Returns
    /// * `Result<Self>` - Client, or a config error if the timeout is invalid
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(GeminiClient {
            executable: config.executable.clone(),
            timeout: config.timeout()?,
            model: config.model.clone(),
            attachment_dir: config.attachment_dir.clone(),
            prompt_via_stdin: config.prompt_via_stdin,
            sandbox: config.sandbox,
            extra_args: config.extra_args.clone(),
        })
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Model used by `generate_default`
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates a response from Gemini for the given conversation.
    ///
    /// # Arguments
    /// * `messages` - Conversation to send, must not be empty
    /// * `model` - Model passed to the CLI with `-m`
    ///
    /// # Returns
    /// * `Result<String>` - Trimmed stdout of the CLI
    ///
    /// # Errors
    /// * `Error::Timeout` if the CLI outlives the timeout; the process is killed
    /// * `Error::ExecutionFailed` on a non-zero exit, with the exit code and stderr
    pub async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let prompt = build_prompt(messages, &self.attachment_dir).await?;
        // `prompt` owns the attachment files until the CLI is done with them.
        self.call_gemini(&prompt.text, model).await
    }

    /// Same as `generate`, with the configured model
    pub async fn generate_default(&self, messages: &[ChatMessage]) -> Result<String> {
        self.generate(messages, &self.model).await
    }

    /// Arguments passed to the executable for one request
    pub fn build_args(&self, prompt: &str, model: &str) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.push("-m".to_string());
        args.push(model.to_string());
        if self.sandbox {
            args.push("--sandbox".to_string());
        }
        if !self.prompt_via_stdin {
            args.push("-p".to_string());
            args.push(prompt.to_string());
        }
        args
    }

    async fn call_gemini(&self, prompt: &str, model: &str) -> Result<String> {
        let args = self.build_args(prompt, model);
        debug!("exec: {} {}", self.executable, args.join(" "));

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(if self.prompt_via_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.executable.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(
                child.wait(),
                feed_stdin(stdin, prompt.as_bytes()),
                read_pipe(stdout),
                read_pipe(stderr),
            )
        })
        .await;

        let (status, (), stdout, stderr) = match finished {
            Ok(outcome) => outcome?,
            Err(_) => {
                warn!(
                    "Gemini CLI exceeded {:.1}s, killing it",
                    self.timeout.as_secs_f64()
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill Gemini CLI: {}", e);
                }
                return Err(Error::Timeout(self.timeout));
            }
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            info!("Gemini CLI exited with {}: {}", status, stderr);
            return Err(Error::ExecutionFailed {
                code: status.code(),
                stderr,
            });
        }

        let response = String::from_utf8_lossy(&stdout).trim().to_string();
        debug!("Gemini response: {} bytes", response.len());
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    /// Runs the CLI with the configured model
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.generate_default(&messages).await
    }
}

/// Writes the prompt and closes stdin; a child that exits without reading is not an error
async fn feed_stdin(stdin: Option<ChildStdin>, payload: &[u8]) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(payload).await {
        Ok(()) => stdin.shutdown().await.or_else(ignore_broken_pipe),
        Err(e) => ignore_broken_pipe(e),
    }
}

fn ignore_broken_pipe(e: std::io::Error) -> std::io::Result<()> {
    if e.kind() == ErrorKind::BrokenPipe {
        debug!("Gemini CLI closed stdin early");
        Ok(())
    } else {
        Err(e)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
