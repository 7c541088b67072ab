//! Running external tools with a deadline

use crate::error::DocumentError;
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whether `program` can be found on `PATH`
pub fn tool_available(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Log a warning for each missing tool; returns true when all are present
pub fn warn_if_missing(programs: &[&str], purpose: &str) -> bool {
    let mut all_present = true;
    for program in programs {
        if !tool_available(program) {
            warn!("'{}' not found on PATH; {} will fail until it is installed", program, purpose);
            all_present = false;
        }
    }
    all_present
}

/// Run a command and return its stdout, killing it after `timeout`
pub fn run_tool(mut command: Command, timeout: Duration) -> Result<String, DocumentError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("Running {:?}", command);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => DocumentError::ToolMissing(program.clone()),
            _ => DocumentError::Io(e),
        })?;

    // Both pipes are drained while the child runs; a full pipe would stall it
    let stdout = drain(child.stdout.take(), &program, "stdout");
    let stderr = drain(child.stderr.take(), &program, "stderr");

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!("Failed to kill {}: {}", program, e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap {}: {}", program, e);
            }
            return Err(DocumentError::ToolFailed {
                tool: program,
                message: format!("timed out after {:?}", timeout),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr.join().unwrap_or_default()).into_owned();
    if !status.success() {
        return Err(DocumentError::ToolFailed {
            tool: program,
            message: format!("{}: {}", status, stderr.trim()),
        });
    }
    if !stderr.trim().is_empty() {
        debug!("{} wrote {} bytes to stderr", program, stderr.len());
    }
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn drain<R>(pipe: Option<R>, program: &str, stream: &'static str) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    let program = program.to_string();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                warn!("Reading {} of {} failed: {}", stream, program, e);
            }
        }
        buf
    })
}
