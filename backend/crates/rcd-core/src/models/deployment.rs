use crate::ShutdownManner;

use serde::Serialize;

/// Shape of the managed proxy as the last reset (or reconfigure) described it.
///
/// The controller keeps one of these for the lifetime of an instance; every
/// readiness expectation is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    /// Ports the proxy listens on
    pub ports: Vec<u16>,
    /// SMP worker processes
    pub workers: u32,
    /// Rock store disk I/O helpers
    pub diskers: u32,
    /// How to stop the instance when no manner is requested
    pub shutdown_manner: ShutdownManner,
    /// Run under the memory checker
    pub memory_checker: bool,
}

impl Deployment {
    pub fn new(ports: Vec<u16>) -> Self {
        Self {
            ports,
            workers: 1,
            diskers: 0,
            shutdown_manner: ShutdownManner::default(),
            memory_checker: false,
        }
    }

    /// Workers plus diskers.
    pub fn kids(&self) -> u64 {
        u64::from(self.workers) + u64::from(self.diskers)
    }

    /// A coordinator process exists only when there is more than one kid.
    pub fn has_coordinator(&self) -> bool {
        self.kids() > 1
    }

    /// Number of "reconfiguring" log lines one reconfiguration produces.
    pub fn expected_reconfiguration_markers(&self) -> u64 {
        self.kids() + u64::from(self.has_coordinator())
    }

    /// Number of "accepting connections" log lines one (re)start produces.
    pub fn expected_accepting_markers(&self) -> u64 {
        u64::from(self.workers) * self.ports.len() as u64
    }

    /// Number of per-kid report sections the diagnostic page shows once
    /// every kid has registered. The coordinator aggregates the page and
    /// does not contribute a section of its own.
    pub fn expected_kid_sections(&self) -> u64 {
        self.kids()
    }

    /// Kid registration only matters when the coordinator exists.
    pub fn waits_for_kids(&self) -> bool {
        self.has_coordinator()
    }
}
