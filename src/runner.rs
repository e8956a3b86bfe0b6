use std::io;
use std::process::Stdio;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::model::{CommandOutcome, OutcomeKind, VpnAction};

pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(30_000);

const SAMPLE_CHARS: usize = 200;

const NETWORK_FAILURE: &str = "there was an error connecting to the protonvpn api";
const AUTH_FAILURE: &str = "authentication failed";
const NO_PRIOR_CONNECTION: &str = "couldn't find a previous connection";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElevationTool {
    Sudo,
    Pkexec,
}

impl ElevationTool {
    pub fn program(&self) -> &'static str {
        match self {
            ElevationTool::Sudo => "sudo",
            ElevationTool::Pkexec => "pkexec",
        }
    }
}

/// What came back from one bounded invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub text: String,
    pub timed_out: bool,
    pub success: bool,
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, argv: &[String], timeout: Duration) -> io::Result<RawOutput>;
}

/// Spawns the real process. On timeout the child is abandoned, not killed.
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, argv: &[String], timeout: Duration) -> io::Result<RawOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(RawOutput {
                    text,
                    timed_out: false,
                    success: output.status.success(),
                })
            }
            Err(_) => Ok(RawOutput {
                timed_out: true,
                ..RawOutput::default()
            }),
        }
    }
}

pub fn build_argv(elevation: ElevationTool, cli_binary: &str, action: VpnAction) -> Vec<String> {
    let mut argv = vec![
        elevation.program().to_string(),
        cli_binary.to_string(),
        action.subcommand().to_string(),
    ];
    argv.extend(action.args().iter().map(|a| a.to_string()));
    argv
}

/// Maps the CLI's wording onto an outcome. The matched phrases are the
/// CLI's messages and must track its releases.
pub fn classify(action: VpnAction, output: &str, exit_ok: bool) -> OutcomeKind {
    if action == VpnAction::Disconnect {
        return OutcomeKind::Success;
    }

    let text = output.to_lowercase();
    if text.contains(NETWORK_FAILURE) {
        OutcomeKind::NetworkFailure
    } else if text.contains(AUTH_FAILURE) {
        OutcomeKind::AuthFailure
    } else if action == VpnAction::Reconnect && text.contains(NO_PRIOR_CONNECTION) {
        OutcomeKind::NoPriorConnection
    } else if exit_ok {
        OutcomeKind::Success
    } else {
        OutcomeKind::Unknown
    }
}

fn sample(text: &str) -> String {
    text.trim().chars().take(SAMPLE_CHARS).collect()
}

pub struct CommandRunner<E> {
    executor: E,
    elevation: ElevationTool,
    cli_binary: String,
    timeout: Duration,
}

impl<E: CommandExecutor> CommandRunner<E> {
    pub fn new(executor: E, elevation: ElevationTool, cli_binary: impl Into<String>) -> Self {
        Self {
            executor,
            elevation,
            cli_binary: cli_binary.into(),
            timeout: COMMAND_TIMEOUT,
        }
    }

    pub async fn run(&self, action: VpnAction) -> CommandOutcome {
        let argv = build_argv(self.elevation, &self.cli_binary, action);
        tracing::debug!(?argv, "running vpn command");

        let (kind, raw_output_sample) = match self.executor.execute(&argv, self.timeout).await {
            Ok(raw) if raw.timed_out => (OutcomeKind::Timeout, String::new()),
            Ok(raw) => (classify(action, &raw.text, raw.success), sample(&raw.text)),
            Err(e) => {
                tracing::error!(%action, error = %e, "failed to launch vpn command");
                (OutcomeKind::Unknown, e.to_string())
            }
        };

        match kind {
            OutcomeKind::Success => tracing::info!(%action, "vpn command finished"),
            OutcomeKind::Timeout => tracing::warn!(
                %action,
                timeout_ms = self.timeout.as_millis() as u64,
                "vpn command timed out, leaving it running"
            ),
            _ => tracing::warn!(%action, ?kind, output = %raw_output_sample, "vpn command failed"),
        }

        CommandOutcome {
            action,
            kind,
            raw_output_sample,
        }
    }
}

/// Background thread that runs queued actions one at a time so the
/// event loop never waits on the CLI.
pub struct CommandWorker {
    tx: mpsc::UnboundedSender<VpnAction>,
}

impl CommandWorker {
    pub fn spawn<E, F>(runner: CommandRunner<E>, on_outcome: F) -> io::Result<Self>
    where
        E: CommandExecutor + 'static,
        F: Fn(CommandOutcome) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<VpnAction>();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("vpn-commands".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(action) = rx.recv().await {
                        on_outcome(runner.run(action).await);
                    }
                });
            })?;

        Ok(Self { tx })
    }

    pub fn submit(&self, action: VpnAction) {
        if self.tx.send(action).is_err() {
            tracing::error!(%action, "command worker is gone, dropping action");
        }
    }
}
