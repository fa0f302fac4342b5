//! PID file handling and signal delivery.

use crate::{InstanceError, InstanceResult};

use rcd_core::ShutdownManner;

use std::fmt;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;

/// The managed process as named by its PID file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    pid: Pid,
}

impl Instance {
    pub fn new(pid: i32) -> Self {
        Self {
            pid: Pid::from_raw(pid),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.pid)
    }
}

/// Outcome of a zero-signal liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Dead,
    /// The check could not tell, e.g. the process belongs to another user
    Indeterminate,
}

/// Signal a shutdown manner is delivered with.
pub fn shutdown_signal(manner: ShutdownManner) -> Signal {
    match manner {
        ShutdownManner::Gracefully => Signal::SIGTERM,
        ShutdownManner::Urgently => Signal::SIGINT,
        ShutdownManner::Immediately => Signal::SIGKILL,
    }
}

/// Reads the PID file the proxy maintains and signals the process it names.
///
/// The supervisor holds no instance handle of its own: every query goes back
/// to the PID file, which the proxy writes on startup and removes on a
/// clean exit.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    pid_file: PathBuf,
    empty_pid_grace: Duration,
}

impl ProcessSupervisor {
    pub fn new(pid_file: PathBuf, empty_pid_grace: Duration) -> Self {
        Self {
            pid_file,
            empty_pid_grace,
        }
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// The instance the PID file names, if any.
    ///
    /// An empty file is usually one the proxy is about to fill, so it is
    /// re-read once after the grace period before being treated as absent.
    pub async fn current_instance(&self) -> InstanceResult<Option<Instance>> {
        let Some(content) = self.read_pid_file().await? else {
            return Ok(None);
        };

        let content = if content.trim().is_empty() {
            tokio::time::sleep(self.empty_pid_grace).await;
            match self.read_pid_file().await? {
                Some(content) if !content.trim().is_empty() => content,
                _ => {
                    debug!("PID file {} is empty", self.pid_file.display());
                    return Ok(None);
                }
            }
        } else {
            content
        };

        self.parse_pid(&content).map(Some)
    }

    /// Zero-signal liveness check of the process.
    pub fn liveness(&self, instance: Instance) -> Liveness {
        match kill(instance.pid, None) {
            Ok(()) => Liveness::Running,
            Err(Errno::ESRCH) => Liveness::Dead,
            Err(e) => {
                warn!("Cannot check {instance}: {e}");
                Liveness::Indeterminate
            }
        }
    }

    /// Whether the instance is alive. A dead instance's PID file is removed.
    pub async fn is_alive(&self, instance: Instance) -> InstanceResult<bool> {
        match self.liveness(instance) {
            Liveness::Running => Ok(true),
            Liveness::Indeterminate => {
                warn!("Treating {instance} as alive");
                Ok(true)
            }
            Liveness::Dead => {
                self.remove_stale_pid_file(instance).await?;
                Ok(false)
            }
        }
    }

    /// The current instance, but only when it is alive.
    pub async fn running_instance(&self) -> InstanceResult<Option<Instance>> {
        match self.current_instance().await? {
            Some(instance) if self.is_alive(instance).await? => Ok(Some(instance)),
            _ => Ok(None),
        }
    }

    /// Ask the instance to shut down. Returns false when the process was
    /// gone by the time the signal was sent.
    pub async fn signal(&self, instance: Instance, manner: ShutdownManner) -> InstanceResult<bool> {
        self.deliver(
            instance,
            shutdown_signal(manner),
            manner.targets_process_group(),
        )
        .await
    }

    /// Ask the instance to reread its configuration.
    pub async fn reconfigure_signal(&self, instance: Instance) -> InstanceResult<bool> {
        self.deliver(instance, Signal::SIGHUP, false).await
    }

    async fn deliver(
        &self,
        instance: Instance,
        signal: Signal,
        process_group: bool,
    ) -> InstanceResult<bool> {
        if !self.is_alive(instance).await? {
            return Err(InstanceError::NotAlive {
                pid: instance.pid(),
                signal: signal.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let result = if process_group {
            killpg(instance.pid, signal)
        } else {
            kill(instance.pid, signal)
        };

        match result {
            Ok(()) => {
                info!(
                    "Sent {signal} to {}{instance}",
                    if process_group { "process group of " } else { "" }
                );
                Ok(true)
            }
            Err(Errno::ESRCH) => {
                info!("{instance} exited before {signal} arrived");
                Ok(false)
            }
            Err(source) => Err(InstanceError::Signal {
                pid: instance.pid(),
                signal: signal.to_string(),
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn read_pid_file(&self) -> InstanceResult<Option<String>> {
        match tokio::fs::read_to_string(&self.pid_file).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(InstanceError::PidFileRead {
                path: self.pid_file.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    #[track_caller]
    fn parse_pid(&self, content: &str) -> InstanceResult<Instance> {
        match content.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(Instance::new(pid)),
            _ => Err(InstanceError::MalformedPidFile {
                path: self.pid_file.clone(),
                content: content.trim().to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn remove_stale_pid_file(&self, instance: Instance) -> InstanceResult<()> {
        warn!(
            "{instance} is gone, removing stale PID file {}",
            self.pid_file.display()
        );

        match tokio::fs::remove_file(&self.pid_file).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(InstanceError::StalePidFile {
                    path: self.pid_file.clone(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        // A new instance may have written the file meanwhile; only the old
        // pid reappearing means the removal did not take.
        if let Some(current) = self.current_instance().await?
            && current == instance
        {
            return Err(InstanceError::StalePidPersists {
                path: self.pid_file.clone(),
                pid: instance.pid(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
