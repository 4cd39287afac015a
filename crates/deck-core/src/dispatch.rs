//! Action Dispatch Engine.
//!
//! `dispatch` never fails: unknown kinds, bad params, spawn errors, non-zero
//! exits and timeouts all come back as a failed [`ActionOutcome`].
//! `dispatch_sequence` runs a button's actions strictly in order and keeps
//! going after a failure.

use crate::action::Action;
use crate::platform::{self, CommandSpec, Platform, PlatformCommands};
use crate::runner::{ProcessRunner, RunError, TokioRunner};
use crate::types::{ActionDescriptor, ActionKind, ActionOutcome, SCRIPT_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ActionExecutor {
    commands: Arc<dyn PlatformCommands>,
    runner: Arc<dyn ProcessRunner>,
    script_timeout: Duration,
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("platform", &self.commands.platform())
            .field("script_timeout", &self.script_timeout)
            .finish_non_exhaustive()
    }
}

impl ActionExecutor {
    pub fn new(commands: Arc<dyn PlatformCommands>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            commands,
            runner,
            script_timeout: SCRIPT_TIMEOUT,
        }
    }

    /// Composer for the running OS, executing real child processes.
    pub fn native() -> Self {
        Self::new(platform::native(), Arc::new(TokioRunner))
    }

    /// Override the run-script limit (30s by default).
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    pub fn platform(&self) -> Platform {
        self.commands.platform()
    }

    pub fn commands(&self) -> &dyn PlatformCommands {
        self.commands.as_ref()
    }

    /// Compose the command for `descriptor` without running it.
    ///
    /// `Ok(None)` means the platform has nothing to run for this action.
    pub fn compose(&self, descriptor: &ActionDescriptor) -> crate::Result<Option<CommandSpec>> {
        let kind = descriptor.action_kind()?;
        let action = Action::parse(kind, &descriptor.params)?;
        Ok(platform::compose(self.commands.as_ref(), &action))
    }

    pub async fn dispatch(&self, descriptor: &ActionDescriptor) -> ActionOutcome {
        let spec = match self.compose(descriptor) {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                debug!(kind = %descriptor.kind, platform = %self.platform(), "no command on this platform");
                return ActionOutcome::success();
            }
            Err(e) => return ActionOutcome::failure(e.to_string()),
        };
        // compose() succeeded, so the kind is known.
        let timeout = descriptor
            .action_kind()
            .ok()
            .and_then(|kind| self.timeout_for(kind));

        debug!(kind = %descriptor.kind, command = %spec, "running action");
        match self.runner.run(&spec, timeout).await {
            Ok(output) if output.success() => ActionOutcome::success(),
            Ok(output) => {
                let mut message = format!("Command failed: {spec}");
                let stderr = output.stderr.trim_end();
                if !stderr.is_empty() {
                    message.push('\n');
                    message.push_str(stderr);
                }
                ActionOutcome::failure(message)
            }
            Err(RunError::Spawn { source, .. }) => ActionOutcome::failure(source.to_string()),
            Err(e) => ActionOutcome::failure(e.to_string()),
        }
    }

    /// Run `descriptors` in order, each awaited before the next starts.
    ///
    /// A failing action is logged and the rest still run. The outcomes are
    /// returned for callers that want them.
    pub async fn dispatch_sequence(&self, descriptors: &[ActionDescriptor]) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let outcome = self.dispatch(descriptor).await;
            if let Some(err) = &outcome.error_message {
                warn!(index, kind = %descriptor.kind, error = %err, "action failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    fn timeout_for(&self, kind: ActionKind) -> Option<Duration> {
        kind.category().timeout().map(|_| self.script_timeout)
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::action::{AppTarget, MediaKey, PointerAction, ScreenshotMode};
    use crate::platform::LinuxCommands;
    use crate::runner::ProcessOutput;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    type Responder = dyn Fn(&CommandSpec) -> Result<ProcessOutput, RunError> + Send + Sync;

    /// Records every command instead of running it.
    pub(crate) struct RecordingRunner {
        pub calls: Mutex<Vec<(CommandSpec, Option<Duration>)>>,
        respond: Box<Responder>,
    }

    impl RecordingRunner {
        pub(crate) fn succeeding() -> Arc<Self> {
            Self::with(|_| Ok(exit(0, "")))
        }

        pub(crate) fn with(
            respond: impl Fn(&CommandSpec) -> Result<ProcessOutput, RunError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            })
        }

        pub(crate) fn programs(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(spec, _)| spec.program.clone())
                .collect()
        }
    }

    pub(crate) fn exit(code: i32, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run<'a>(
            &'a self,
            spec: &'a CommandSpec,
            timeout: Option<Duration>,
        ) -> BoxFuture<'a, Result<ProcessOutput, RunError>> {
            self.calls.lock().unwrap().push((spec.clone(), timeout));
            let result = (self.respond)(spec);
            Box::pin(async move { result })
        }
    }

    pub(crate) fn linux_executor(runner: Arc<RecordingRunner>) -> ActionExecutor {
        ActionExecutor::new(platform::for_platform(Platform::Linux), runner)
    }

    /// Linux composer whose tools are shell scripts in `dir`, run through
    /// `sh` so the real runner can execute them without touching `PATH`.
    pub(crate) struct StubbedTools {
        pub dir: std::path::PathBuf,
    }

    impl StubbedTools {
        fn relocate(&self, spec: Option<CommandSpec>) -> Option<CommandSpec> {
            spec.map(|spec| {
                let script = self.dir.join(&spec.program).display().to_string();
                let mut stub = CommandSpec::new("sh").arg(script).args(spec.args);
                stub.stdin = spec.stdin;
                stub
            })
        }
    }

    impl PlatformCommands for StubbedTools {
        fn platform(&self) -> Platform {
            Platform::Linux
        }

        fn open(&self, target: &str) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.open(target))
        }

        fn close_app(&self, target: &AppTarget) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.close_app(target))
        }

        fn write_clipboard(&self, text: &str) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.write_clipboard(text))
        }

        fn run_script(&self, script: &str, shell: Option<&str>) -> Option<CommandSpec> {
            LinuxCommands.run_script(script, shell)
        }

        fn media(&self, key: MediaKey) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.media(key))
        }

        fn screenshot(&self, mode: ScreenshotMode) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.screenshot(mode))
        }

        fn pointer(&self, action: PointerAction) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.pointer(action))
        }

        fn hotkey(&self, keys: &[String]) -> Option<CommandSpec> {
            self.relocate(LinuxCommands.hotkey(keys))
        }

        fn required_tools(&self) -> &'static [&'static str] {
            LinuxCommands.required_tools()
        }
    }
}
