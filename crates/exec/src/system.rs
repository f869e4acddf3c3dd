use crate::{CommandOutput, CommandSpec, ExecError, Runner};
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// How long the pipes may stay open after the child exits.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Runs commands on the host with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Runner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        tracing::debug!(command = %spec.command_line(), captured = spec.is_captured(), "running command");
        let program = spec.program().to_string();

        let mut command = Command::new(spec.program());
        command.args(spec.arguments());
        if spec.is_captured() {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
            command.stdin(if spec.stdin_text().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        }

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().map(Drain::start);
        let stderr = child.stderr.take().map(Drain::start);
        if let (Some(stdin), Some(text)) = (child.stdin.take(), spec.stdin_text()) {
            feed(stdin, text.to_string(), program.clone());
        }

        // On timeout the readers and the writer are left detached.
        let status = wait(&mut child, spec.timeout_duration(), &program)?;
        let deadline = Instant::now() + DRAIN_GRACE;
        let mut output = collect(stdout, deadline, &program);
        output.push_str(&collect(stderr, deadline, &program));

        let code = status.code().unwrap_or(-1);
        tracing::debug!(command = %spec.command_line(), code, "command finished");
        Ok(CommandOutput { code, output })
    }

    fn has_tool(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}

fn wait(child: &mut Child, timeout: Option<Duration>, program: &str) -> Result<ExitStatus, ExecError> {
    let io_err = |source| ExecError::Io {
        program: program.to_string(),
        source,
    };
    let Some(timeout) = timeout else {
        return child.wait().map_err(io_err);
    };
    match child.wait_timeout(timeout).map_err(io_err)? {
        Some(status) => Ok(status),
        None => {
            tracing::warn!(program, secs = timeout.as_secs(), "command timed out, killing");
            // The child may have exited between the timeout and the kill.
            let _ = child.kill();
            let _ = child.wait();
            Err(ExecError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    }
}

/// Writes stdin off the calling thread. Dropping the handle closes the pipe.
fn feed(mut stdin: ChildStdin, text: String, program: String) {
    std::thread::spawn(move || match stdin.write_all(text.as_bytes()) {
        Ok(()) => {}
        // The child stopped reading; its exit status still tells the story.
        Err(err) if err.kind() == ErrorKind::BrokenPipe => {
            tracing::debug!(program, "child closed stdin early");
        }
        Err(err) => tracing::warn!(program, error = %err, "failed to write stdin"),
    });
}

/// A pipe being read to the end on its own thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl Drain {
    fn start<R: Read + Send + 'static>(mut reader: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = std::thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
        Self { buf, handle }
    }

    fn text(&self) -> String {
        let bytes = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Waits for EOF until `deadline`; a background grandchild can hold the pipe open indefinitely.
fn collect(drain: Option<Drain>, deadline: Instant, program: &str) -> String {
    let Some(drain) = drain else {
        return String::new();
    };
    while !drain.handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!(program, "output pipe still open after exit, keeping partial output");
            return drain.text();
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let text = drain.text();
    let _ = drain.handle.join();
    text
}
