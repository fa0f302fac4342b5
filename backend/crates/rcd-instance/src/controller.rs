//! Lifecycle state machine of the managed proxy.

use crate::{
    DiagnosticsClient, ExecutionEnvironment, HealthReporter, Instance, InstanceError,
    InstanceResult, InstanceState, Launcher, MarkerCounts, MemoryCheckerEnvironment, PROXY_HOST,
    ProcessSupervisor, ReadinessPoller, access_log::read_records, rotate_dir,
};

use rcd_config::Config;
use rcd_core::{
    AccessRecord, Deployment, HealthReport, ReconfigureOptions, ResetOptions, ShutdownManner,
    StopOptions, WaitActiveRequestsOptions,
};

use std::future::Future;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use error_location::ErrorLocation;
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard, RwLock, watch};
use tokio_util::sync::CancellationToken;

/// Owns the one managed proxy instance and every transition it goes through.
///
/// Lifecycle operations (reset, stop, restart, reconfigure) are mutually
/// exclusive: a second one arriving while the first runs fails immediately
/// with [`InstanceError::OperationInProgress`]. Queries run alongside them.
/// State changes are published on a watch channel.
pub struct LifecycleController {
    config: Config,
    supervisor: ProcessSupervisor,
    launcher: Launcher,
    poller: ReadinessPoller,
    diagnostics: DiagnosticsClient,
    reporter: HealthReporter,
    deployment: RwLock<Deployment>,
    operation: Mutex<()>,
    state_tx: watch::Sender<InstanceState>,
}

impl LifecycleController {
    pub fn new(config: Config) -> InstanceResult<Self> {
        let supervisor = ProcessSupervisor::new(
            config.pid_file(),
            Duration::from_millis(config.readiness.empty_pid_grace_ms),
        );
        let (state_tx, _) = watch::channel(InstanceState::Stopped);

        Ok(Self {
            supervisor,
            launcher: Launcher::from_config(&config),
            poller: ReadinessPoller::from_config(&config.readiness),
            diagnostics: DiagnosticsClient::new(PROXY_HOST)?,
            reporter: HealthReporter::from_config(&config),
            deployment: RwLock::new(Deployment::new(config.proxy.default_ports.clone())),
            operation: Mutex::new(()),
            state_tx,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> InstanceState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<InstanceState> {
        self.state_tx.subscribe()
    }

    pub async fn deployment(&self) -> Deployment {
        self.deployment.read().await.clone()
    }

    /// Derive the initial state from the PID file and the first listening
    /// port. An instance left behind by an earlier daemon is adopted.
    pub async fn boot(&self) -> InstanceResult<InstanceState> {
        let port = self.first_port().await;
        let accepting = port_accepts(port).await;

        let state = match self.supervisor.running_instance().await? {
            Some(instance) => {
                if accepting {
                    info!("Adopting running proxy {instance} on port {port}");
                } else {
                    warn!("Proxy {instance} is alive but port {port} does not accept connections");
                }
                InstanceState::Running
            }
            None => {
                if accepting {
                    warn!("Port {port} accepts connections but no proxy instance is recorded");
                }
                InstanceState::Stopped
            }
        };

        self.set_state(state);
        Ok(state)
    }

    /// Start the proxy with the current deployment.
    pub async fn start(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        let _guard = self.begin("start")?;
        self.start_instance(cancel).await
    }

    pub async fn stop(&self, options: &StopOptions, cancel: &CancellationToken) -> InstanceResult<()> {
        let _guard = self.begin("stop")?;
        let manner = match options.shutdown_manner {
            Some(manner) => manner,
            None => self.deployment.read().await.shutdown_manner,
        };
        self.stop_instance(manner, cancel).await
    }

    pub async fn restart(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        let _guard = self.begin("restart")?;
        let manner = self.deployment.read().await.shutdown_manner;
        self.stop_instance(manner, cancel).await?;
        self.start_instance(cancel).await
    }

    /// Make the running proxy reread its configuration and wait until every
    /// process has reported back.
    pub async fn reconfigure(
        &self,
        options: &ReconfigureOptions,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        let _guard = self.begin("reconfigure")?;

        let Some(instance) = self.supervisor.running_instance().await? else {
            return Err(InstanceError::not_running("reconfigure"));
        };

        let deployment = {
            let mut deployment = self.deployment.write().await;
            if let Some(workers) = options.workers {
                deployment.workers = workers;
            }
            if let Some(diskers) = options.diskers {
                deployment.diskers = diskers;
            }
            deployment.clone()
        };

        self.set_state(InstanceState::Reconfiguring);
        let result = self.reconfigure_instance(instance, &deployment, cancel).await;
        self.settle_state().await;
        result
    }

    /// Replace the proxy configuration and start over with fresh state
    /// directories.
    pub async fn reset(
        &self,
        options: &ResetOptions,
        configuration: &str,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        let _guard = self.begin("reset")?;

        let deployment = Deployment {
            ports: options
                .listening_ports
                .clone()
                .unwrap_or_else(|| self.config.proxy.default_ports.clone()),
            workers: options.workers.unwrap_or(1),
            diskers: options.diskers.unwrap_or(0),
            shutdown_manner: options.shutdown_manner.unwrap_or_default(),
            memory_checker: options.memory_checker.unwrap_or(false),
        };
        info!("Resetting proxy to {deployment:?}");

        self.stop_instance(deployment.shutdown_manner, cancel).await?;

        let config_file = self.config.proxy_config_file();
        if let Some(parent) = config_file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstanceError::file(parent, e))?;
        }
        tokio::fs::write(&config_file, configuration)
            .await
            .map_err(|e| InstanceError::file(&config_file, e))?;
        info!(
            "Wrote {} bytes of configuration to {}",
            configuration.len(),
            config_file.display()
        );

        rotate_dir(&self.config.log_dir()).await?;
        rotate_dir(&self.config.cache_dir()).await?;

        if self.config.proxy.initialize_cache {
            self.launcher.initialize_cache(cancel).await?;
        }

        *self.deployment.write().await = deployment;
        self.start_instance(cancel).await
    }

    /// Health of the current deployment. Memory checker summaries are only
    /// required once the instance is gone.
    pub async fn check(&self) -> InstanceResult<HealthReport> {
        let running = self.supervisor.running_instance().await?.is_some();
        let memory_checker = self.deployment.read().await.memory_checker;
        self.reporter.report(memory_checker, !running).await
    }

    /// Wait until the proxy has no transactions in progress.
    pub async fn finish_caching(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        self.wait_for_active_requests("finish caching", None, 0, cancel)
            .await
    }

    /// Wait until the number of matching transactions in progress reaches
    /// the requested count. Returns that count.
    pub async fn wait_active_requests(
        &self,
        options: &WaitActiveRequestsOptions,
        cancel: &CancellationToken,
    ) -> InstanceResult<u32> {
        self.wait_for_active_requests(
            "wait for active requests",
            options.request_path.as_deref(),
            options.active_requests,
            cancel,
        )
        .await?;
        Ok(options.active_requests)
    }

    pub async fn access_records(&self) -> InstanceResult<Vec<AccessRecord>> {
        read_records(&self.config.access_log()).await
    }

    pub async fn execution_environment(&self, protocol_version: &str) -> ExecutionEnvironment {
        let proxy_binary = self.launcher.proxy_binary().ok();
        let proxy_version = match proxy_binary {
            Some(_) => match self.launcher.version_banner().await {
                Ok(banner) => Some(banner),
                Err(e) => {
                    warn!("Cannot query proxy version: {e}");
                    None
                }
            },
            None => None,
        };
        let memory_checker = self.launcher.memory_checker_binary();

        ExecutionEnvironment {
            daemon_version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: protocol_version.to_string(),
            proxy_binary: proxy_binary.map(|path| path.display().to_string()),
            proxy_version,
            memory_checker: MemoryCheckerEnvironment {
                name: self.launcher.memory_checker_name().to_string(),
                available: memory_checker.is_some(),
                binary: memory_checker.map(|path| path.display().to_string()),
            },
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    #[track_caller]
    fn begin(&self, requested: &'static str) -> InstanceResult<MutexGuard<'_, ()>> {
        self.operation
            .try_lock()
            .map_err(|_| InstanceError::OperationInProgress {
                requested,
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn set_state(&self, state: InstanceState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!("Proxy state: {previous} -> {state}");
        }
    }

    /// Publish whatever the PID file says after a failed step.
    async fn settle_state(&self) {
        let state = match self.supervisor.running_instance().await {
            Ok(Some(_)) => InstanceState::Running,
            Ok(None) => InstanceState::Stopped,
            Err(e) => {
                error!("Cannot determine proxy state: {e}");
                InstanceState::Stopped
            }
        };
        self.set_state(state);
    }

    async fn first_port(&self) -> u16 {
        let deployment = self.deployment.read().await;
        deployment
            .ports
            .first()
            .copied()
            .or_else(|| self.config.proxy.default_ports.first().copied())
            .unwrap_or_default()
    }

    fn readiness_deadline(&self) -> Option<Duration> {
        match self.config.proxy.start_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    async fn wait<F, Fut>(
        &self,
        description: &str,
        cancel: &CancellationToken,
        predicate: F,
    ) -> InstanceResult<u64>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = InstanceResult<bool>>,
    {
        match self.readiness_deadline() {
            Some(deadline) => {
                self.poller
                    .wait_for_within(description, deadline, cancel, predicate)
                    .await
            }
            None => self.poller.wait_for(description, cancel, predicate).await,
        }
    }

    async fn start_instance(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        if let Some(instance) = self.supervisor.running_instance().await? {
            return Err(InstanceError::AlreadyRunning {
                operation: "start",
                pid: instance.pid(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.set_state(InstanceState::Starting);
        let result = self.launch_and_wait(cancel).await;
        if let Err(e) = &result {
            error!("Proxy start failed: {e}");
        }
        self.settle_state().await;
        result
    }

    async fn launch_and_wait(&self, cancel: &CancellationToken) -> InstanceResult<()> {
        let requested = self.deployment.read().await.clone();
        let launched = self.launcher.launch(requested.memory_checker)?;
        let deployment = {
            let mut deployment = self.deployment.write().await;
            deployment.memory_checker = launched.memory_checker;
            deployment.clone()
        };

        let supervisor = &self.supervisor;
        self.wait("proxy process to come alive", cancel, move || async move {
            Ok(supervisor.running_instance().await?.is_some())
        })
        .await?;

        for &port in &deployment.ports {
            self.wait(
                &format!("port {port} to accept connections"),
                cancel,
                move || async move { Ok(port_accepts(port).await) },
            )
            .await?;
        }

        if deployment.waits_for_kids() {
            let diagnostics = &self.diagnostics;
            let page = self.config.proxy.kids_page.as_str();
            let port = self.first_port().await;
            let expected = deployment.expected_kid_sections();

            self.wait(
                &format!("{expected} kids to register"),
                cancel,
                move || async move {
                    let observed = diagnostics.kid_sections(port, page).await?;
                    if observed > expected {
                        return Err(InstanceError::KidSectionsOvershoot {
                            expected,
                            observed,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                    Ok(observed == expected)
                },
            )
            .await?;
        }

        info!(
            "Proxy running: {} worker(s), {} disker(s), ports {:?}{}",
            deployment.workers,
            deployment.diskers,
            deployment.ports,
            if deployment.memory_checker {
                ", under the memory checker"
            } else {
                ""
            }
        );
        Ok(())
    }

    async fn stop_instance(
        &self,
        manner: ShutdownManner,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        let Some(instance) = self.supervisor.running_instance().await? else {
            warn!("Proxy is already stopped");
            self.set_state(InstanceState::Stopped);
            return Ok(());
        };

        self.set_state(InstanceState::Stopping);
        let result = self.signal_and_wait(instance, manner, cancel).await;
        self.settle_state().await;
        result
    }

    async fn signal_and_wait(
        &self,
        instance: Instance,
        manner: ShutdownManner,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        info!("Stopping proxy {instance} {manner}");

        match self.supervisor.signal(instance, manner).await {
            Ok(true) => {}
            Ok(false) | Err(InstanceError::NotAlive { .. }) => {
                info!("Proxy {instance} was already gone");
            }
            Err(e) => return Err(e),
        }

        let supervisor = &self.supervisor;
        self.wait("proxy to exit", cancel, move || async move {
            Ok(supervisor.running_instance().await?.is_none())
        })
        .await?;

        info!("Proxy stopped");
        Ok(())
    }

    async fn reconfigure_instance(
        &self,
        instance: Instance,
        deployment: &Deployment,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        let main_log = self.config.main_log();
        let baseline = MarkerCounts::sample(&main_log).await?;
        let expected = MarkerCounts {
            reconfiguring: deployment.expected_reconfiguration_markers(),
            accepting: deployment.expected_accepting_markers(),
        };

        if !self.supervisor.reconfigure_signal(instance).await? {
            return Err(InstanceError::not_running("reconfigure"));
        }

        let last_reconfiguring = AtomicU64::new(baseline.reconfiguring);
        let last_accepting = AtomicU64::new(baseline.accepting);
        let (main_log, last_reconfiguring, last_accepting) =
            (&main_log, &last_reconfiguring, &last_accepting);

        self.wait("reconfiguration to finish", cancel, move || async move {
            let current = MarkerCounts::sample(main_log).await?;
            current.ensure_not_below(&MarkerCounts {
                reconfiguring: last_reconfiguring.load(Ordering::Relaxed),
                accepting: last_accepting.load(Ordering::Relaxed),
            })?;
            last_reconfiguring.store(current.reconfiguring, Ordering::Relaxed);
            last_accepting.store(current.accepting, Ordering::Relaxed);

            let delta = current.since(&baseline);
            for (marker, expected, observed) in [
                (MarkerCounts::RECONFIGURING, expected.reconfiguring, delta.reconfiguring),
                (MarkerCounts::ACCEPTING, expected.accepting, delta.accepting),
            ] {
                if observed > expected {
                    return Err(InstanceError::ReconfigurationOvershoot {
                        marker,
                        expected,
                        observed,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
            Ok(delta == expected)
        })
        .await?;

        info!("Proxy {instance} reconfigured");
        Ok(())
    }

    async fn wait_for_active_requests(
        &self,
        operation: &'static str,
        filter: Option<&str>,
        target: u32,
        cancel: &CancellationToken,
    ) -> InstanceResult<()> {
        if self.supervisor.running_instance().await?.is_none() {
            return Err(InstanceError::not_running(operation));
        }

        let diagnostics = &self.diagnostics;
        let port = self.first_port().await;
        let description = match filter {
            Some(filter) => format!("{target} active requests matching '{filter}'"),
            None => format!("{target} active requests"),
        };

        self.wait(&description, cancel, move || async move {
            Ok(diagnostics.active_requests(port, filter).await? == target)
        })
        .await?;

        Ok(())
    }
}

async fn port_accepts(port: u16) -> bool {
    TcpStream::connect((PROXY_HOST, port)).await.is_ok()
}
