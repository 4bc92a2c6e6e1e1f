/*!
 * nodetool.rs — Where the tpstats report comes from
 *
 * Normally `nodetool -h <host> -p <port> tpstats` is run against the node,
 * but a previously captured report can be read from disk instead.
 *
 * License: GPLv3+
 */

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::CheckError;

/// Default time allowed for nodetool to answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time to collect pipe output after the child has exited.
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can produce raw tpstats text.
pub trait ReportSource {
    fn fetch(&self) -> Result<String, CheckError>;

    /// Human readable origin, for logs.
    fn describe(&self) -> String;
}

/// Runs nodetool against a live node.
#[derive(Debug, Clone)]
pub struct Nodetool {
    pub program: String,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Nodetool {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Nodetool {
            program: "nodetool".to_string(),
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-h".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
            "tpstats".to_string(),
        ]
    }

    fn spawn(&self) -> Result<Child, CheckError> {
        Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CheckError::NodetoolSpawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Drain a pipe on a background thread so the child never blocks on a
/// full pipe buffer while we wait on it.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(mut stream) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let result = stream.read_to_end(&mut buf).map(|_| buf);
                let _ = tx.send(result);
            });
        }
        None => {
            let _ = tx.send(Ok(Vec::new()));
        }
    }
    rx
}

impl ReportSource for Nodetool {
    fn fetch(&self) -> Result<String, CheckError> {
        debug!(program = %self.program, args = ?self.args(), "running nodetool");
        let mut child = self.spawn()?;

        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let status = child
            .wait_timeout(self.timeout)
            .map_err(|source| CheckError::NodetoolSpawn {
                program: self.program.clone(),
                source,
            })?;

        let Some(status) = status else {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to kill nodetool after timeout");
            }
            let _ = child.wait();
            return Err(CheckError::NodetoolTimeout {
                program: self.program.clone(),
                secs: self.timeout.as_secs(),
            });
        };

        let collect = |rx: mpsc::Receiver<std::io::Result<Vec<u8>>>| -> Result<Vec<u8>, CheckError> {
            match rx.recv_timeout(OUTPUT_COLLECTION_TIMEOUT) {
                Ok(Ok(buf)) => Ok(buf),
                Ok(Err(e)) => Err(CheckError::NodetoolOutput {
                    program: self.program.clone(),
                    reason: e.to_string(),
                }),
                Err(_) => Err(CheckError::NodetoolOutput {
                    program: self.program.clone(),
                    reason: "output collection timed out".to_string(),
                }),
            }
        };
        let stdout = collect(stdout_rx)?;
        let stderr = collect(stderr_rx).unwrap_or_default();

        if !status.success() {
            return Err(CheckError::NodetoolFailed {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        String::from_utf8(stdout).map_err(|e| CheckError::NodetoolOutput {
            program: self.program.clone(),
            reason: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("{} -h {} -p {} tpstats", self.program, self.host, self.port)
    }
}

/// A tpstats report saved to a file.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub path: PathBuf,
}

impl ReportSource for ReportFile {
    fn fetch(&self) -> Result<String, CheckError> {
        fs::read_to_string(&self.path).map_err(|source| CheckError::ReportRead {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
