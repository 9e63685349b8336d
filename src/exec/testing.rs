//! Test doubles for the command runner and the process launcher.

use crate::exec::sink::ResultsSink;
use crate::exec::{ChildProcess, CommandError, CommandRunner, Invocation, ProcessLauncher};
use std::io;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(unix)]
pub(crate) fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub(crate) fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Failure as a scripted runner would report it.
pub(crate) fn failure(invocation: &Invocation, message: &str) -> CommandError {
    CommandError::Other {
        program: invocation.program_name(),
        message: message.to_string(),
    }
}

type Respond = Box<dyn Fn(&Invocation) -> Result<(), CommandError> + Send + Sync>;

/// Records every invocation and answers with a scripted result.
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    respond: Respond,
}

impl RecordingRunner {
    pub(crate) fn succeeding() -> Self {
        Self::with(|_| Ok(()))
    }

    pub(crate) fn with<F>(respond: F) -> Self
    where
        F: Fn(&Invocation) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// `program arg arg ...` for each call, with the program reduced to its
    /// file name.
    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                let mut parts = vec![c.program_name()];
                parts.extend(c.arg_strings());
                parts.join(" ")
            })
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation)
    }
}

/// What a scripted child does once waited on.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Script {
    ExitAfter(Duration, i32),
    Hang,
    WaitError,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct KillCounter(Arc<AtomicUsize>);

impl KillCounter {
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedChild {
    script: Script,
    kill_error: Option<(io::ErrorKind, &'static str)>,
    kills: KillCounter,
}

impl ScriptedChild {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            kill_error: None,
            kills: KillCounter::default(),
        }
    }

    pub(crate) fn failing_kill(mut self, kind: io::ErrorKind, message: &'static str) -> Self {
        self.kill_error = Some((kind, message));
        self
    }

    pub(crate) fn with_counter(mut self, kills: KillCounter) -> Self {
        self.kills = kills;
        self
    }

    pub(crate) fn kill_counter(&self) -> KillCounter {
        self.kills.clone()
    }
}

impl ChildProcess for ScriptedChild {
    async fn wait(&mut self) -> io::Result<ExitStatus> {
        match self.script {
            Script::ExitAfter(after, code) => {
                tokio::time::sleep(after).await;
                Ok(exit_status(code))
            }
            Script::Hang => std::future::pending::<io::Result<ExitStatus>>().await,
            Script::WaitError => Err(io::Error::new(io::ErrorKind::Other, "wait failed")),
        }
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.kills.0.fetch_add(1, Ordering::SeqCst);

        match self.kill_error {
            Some((kind, message)) => Err(io::Error::new(kind, message)),
            None => Ok(()),
        }
    }
}

type Spawn = Box<dyn Fn(&Invocation) -> io::Result<ScriptedChild> + Send + Sync>;

/// Records launches and hands out scripted children.
pub(crate) struct ScriptedLauncher {
    launched: Mutex<Vec<Invocation>>,
    spawn: Spawn,
}

impl ScriptedLauncher {
    pub(crate) fn with<F>(spawn: F) -> Self
    where
        F: Fn(&Invocation) -> io::Result<ScriptedChild> + Send + Sync + 'static,
    {
        Self {
            launched: Mutex::new(Vec::new()),
            spawn: Box::new(spawn),
        }
    }

    pub(crate) fn launched(&self) -> Vec<Invocation> {
        self.launched.lock().unwrap().clone()
    }

    /// Value following `flag` in each launched invocation.
    pub(crate) fn flag_values(&self, flag: &str) -> Vec<String> {
        self.launched()
            .iter()
            .filter_map(|inv| {
                let args = inv.arg_strings();
                let pos = args.iter().position(|a| a == flag)?;
                args.get(pos + 1).cloned()
            })
            .collect()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    type Child = ScriptedChild;

    fn launch(&self, invocation: &Invocation, _sink: &ResultsSink) -> io::Result<ScriptedChild> {
        self.launched.lock().unwrap().push(invocation.clone());
        (self.spawn)(invocation)
    }
}
