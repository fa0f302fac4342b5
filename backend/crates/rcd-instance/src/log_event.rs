//! Classification of the proxy's log and diagnostic lines.

use std::sync::LazyLock;

use regex::Regex;

/// Assertion failures, logged just before the process aborts.
pub const ASSERTION_PATTERN: &str = r"\bassertion failed:";
/// Fatal errors; the process exits after logging one.
pub const FATAL_PATTERN: &str = r"\bFATAL:";
pub const ERROR_PATTERN: &str = r"\bERROR:";
pub const WARNING_PATTERN: &str = r"\bWARNING:";
/// Logged once per process (every kid and the coordinator) on SIGHUP.
pub const RECONFIGURING_PATTERN: &str = r"\bReconfiguring Squid Cache\b";
/// Logged by every worker for every listening port it opens.
pub const ACCEPTING_PATTERN: &str = r"\bAccepting (?:[\w-]+ )*HTTP Socket connections at\b";
/// Ends one kid's section of an aggregated diagnostic page.
pub const KID_SECTION_CLOSED_PATTERN: &str = r"^\s*\} by kid\d+\s*$";

static ASSERTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ASSERTION_PATTERN).expect("Invalid assertion pattern"));
static FATAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FATAL_PATTERN).expect("Invalid fatal pattern"));
static ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ERROR_PATTERN).expect("Invalid error pattern"));
static WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WARNING_PATTERN).expect("Invalid warning pattern"));
static RECONFIGURING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RECONFIGURING_PATTERN).expect("Invalid reconfiguring pattern"));
static ACCEPTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACCEPTING_PATTERN).expect("Invalid accepting pattern"));
static KID_SECTION_CLOSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(KID_SECTION_CLOSED_PATTERN).expect("Invalid kid section pattern")
});

/// A line that means something to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogEvent {
    Warning,
    Error,
    Fatal,
    AssertionFailure,
    Reconfiguring,
    AcceptingConnections,
    KidSectionClosed,
}

impl LogEvent {
    /// Classify one line. The most severe match wins; markers are only
    /// reported for lines that are not problems themselves.
    pub fn classify(line: &str) -> Option<Self> {
        if ASSERTION.is_match(line) {
            Some(Self::AssertionFailure)
        } else if FATAL.is_match(line) {
            Some(Self::Fatal)
        } else if ERROR.is_match(line) {
            Some(Self::Error)
        } else if WARNING.is_match(line) {
            Some(Self::Warning)
        } else if RECONFIGURING.is_match(line) {
            Some(Self::Reconfiguring)
        } else if ACCEPTING.is_match(line) {
            Some(Self::AcceptingConnections)
        } else if KID_SECTION_CLOSED.is_match(line) {
            Some(Self::KidSectionClosed)
        } else {
            None
        }
    }

    /// Whether the line belongs in a health report.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::Warning | Self::Error | Self::Fatal | Self::AssertionFailure
        )
    }
}
