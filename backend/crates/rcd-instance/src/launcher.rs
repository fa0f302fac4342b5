//! Building and running the proxy's command lines.

use crate::{InstanceError, InstanceResult};

use rcd_config::Config;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use error_location::ErrorLocation;
use log::{debug, info, warn};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// What [`Launcher::launch`] started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchedProcess {
    /// Pid of the launched process, which may be a short-lived parent of the
    /// daemonized proxy. The PID file stays authoritative.
    pub pid: Option<u32>,
    /// Whether the proxy runs under the memory checker
    pub memory_checker: bool,
}

/// Starts the proxy as a detached process, optionally wrapped by the memory
/// checker, and runs its one-shot helper invocations.
#[derive(Debug, Clone)]
pub struct Launcher {
    binary: String,
    config_file: PathBuf,
    extra_args: Vec<String>,
    working_dir: PathBuf,
    memory_checker_binary: String,
    memory_checker_args: Vec<String>,
    memory_checker_log: PathBuf,
}

impl Launcher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            binary: config.proxy.binary.clone(),
            config_file: config.proxy_config_file(),
            extra_args: config.proxy.extra_args.clone(),
            working_dir: config.dir.clone(),
            memory_checker_binary: config.memory_checker.binary.clone(),
            memory_checker_args: config.memory_checker.args.clone(),
            memory_checker_log: config.memory_checker_log(),
        }
    }

    /// Locate an executable.
    ///
    /// Names containing a slash are paths (relative ones resolve against the
    /// working directory); bare names are looked up on the system PATH.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        if name.contains('/') {
            let path = self.working_dir.join(name);
            return path.is_file().then_some(path);
        }

        if let Ok(output) = std::process::Command::new("which").arg(name).output()
            && output.status.success()
        {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        None
    }

    pub fn proxy_binary(&self) -> InstanceResult<PathBuf> {
        self.find_executable(&self.binary)
            .ok_or_else(|| InstanceError::BinaryNotFound {
                name: self.binary.clone(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn memory_checker_binary(&self) -> Option<PathBuf> {
        self.find_executable(&self.memory_checker_binary)
    }

    pub fn memory_checker_name(&self) -> &str {
        &self.memory_checker_binary
    }

    /// Program and arguments of a normal launch.
    pub fn launch_command(&self, proxy: &Path, memory_checker: Option<&Path>) -> (PathBuf, Vec<String>) {
        let mut proxy_args = vec![
            String::from("-f"),
            self.config_file.display().to_string(),
        ];
        proxy_args.extend(self.extra_args.iter().cloned());

        match memory_checker {
            Some(checker) => {
                let mut args = vec![format!(
                    "--log-file={}",
                    self.memory_checker_log.display()
                )];
                args.extend(self.memory_checker_args.iter().cloned());
                args.push(proxy.display().to_string());
                args.extend(proxy_args);
                (checker.to_path_buf(), args)
            }
            None => (proxy.to_path_buf(), proxy_args),
        }
    }

    /// Program and arguments of the cache initialization run.
    pub fn initialize_cache_command(&self, proxy: &Path) -> (PathBuf, Vec<String>) {
        let mut args = vec![
            String::from("-N"),
            String::from("-z"),
            String::from("-f"),
            self.config_file.display().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        (proxy.to_path_buf(), args)
    }

    /// Launch the proxy in its own session with stdio closed.
    ///
    /// When the memory checker is requested but cannot be found, the proxy
    /// runs unwrapped; the returned [`LaunchedProcess`] says which happened.
    pub fn launch(&self, use_memory_checker: bool) -> InstanceResult<LaunchedProcess> {
        let proxy = self.proxy_binary()?;

        let memory_checker = if use_memory_checker {
            let found = self.memory_checker_binary();
            if found.is_none() {
                warn!(
                    "Memory checker '{}' requested but not found, running the proxy unwrapped",
                    self.memory_checker_binary
                );
            }
            found
        } else {
            None
        };

        let (program, args) = self.launch_command(&proxy, memory_checker.as_deref());
        info!("Launching {} {}", program.display(), args.join(" "));

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Detach into a new session so the proxy leads its own process group
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|source| InstanceError::Launch {
            program: program.display().to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let pid = child.id();
        info!("Launched process {pid:?}");

        // Reap the launched process so an exited proxy never lingers as a
        // zombie that still answers liveness checks.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Launched process {pid:?} exited: {status}"),
                Ok(status) => warn!("Launched process {pid:?} exited: {status}"),
                Err(e) => warn!("Cannot reap launched process {pid:?}: {e}"),
            }
        });

        Ok(LaunchedProcess {
            pid,
            memory_checker: memory_checker.is_some(),
        })
    }

    /// Create the cache structures the configuration asks for, then exit.
    ///
    /// Cancellation kills the initializing process.
    pub async fn initialize_cache(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        let proxy = self.proxy_binary()?;
        let (program, args) = self.initialize_cache_command(&proxy);
        info!("Initializing cache: {} {}", program.display(), args.join(" "));

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::select! {
            output = cmd.output() => output,
            _ = cancel.cancelled() => {
                return Err(InstanceError::Cancelled {
                    description: String::from("cache initialization"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        .map_err(|source| InstanceError::Launch {
            program: program.display().to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !output.status.success() {
            return Err(InstanceError::CacheInitialization {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// What `<proxy> -v` prints.
    pub async fn version_banner(&self) -> InstanceResult<String> {
        let proxy = self.proxy_binary()?;

        let output = Command::new(&proxy)
            .arg("-v")
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| InstanceError::Launch {
                program: proxy.display().to_string(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
