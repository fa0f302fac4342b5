use rcd_core::{
    ReconfigureOptions, ResetOptions, StopOptions, WaitActiveRequestsOptions,
};

use http::Method;

/// Which command a request line routes to, before its options are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Reset,
    Check,
    Stop,
    Restart,
    Reconfigure,
    FinishCaching,
    WaitActiveRequests,
    GetAccessRecords,
    ExecutionEnvironment,
}

impl CommandKind {
    pub const ALL: [CommandKind; 9] = [
        Self::Reset,
        Self::Check,
        Self::Stop,
        Self::Restart,
        Self::Reconfigure,
        Self::FinishCaching,
        Self::WaitActiveRequests,
        Self::GetAccessRecords,
        Self::ExecutionEnvironment,
    ];

    pub fn method(&self) -> Method {
        match self {
            Self::Reset => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Reset => "/reset",
            Self::Check => "/check",
            Self::Stop => "/stop",
            Self::Restart => "/restart",
            Self::Reconfigure => "/reconfigure",
            Self::FinishCaching => "/finishCaching",
            Self::WaitActiveRequests => "/waitActiveRequests",
            Self::GetAccessRecords => "/getAccessRecords",
            Self::ExecutionEnvironment => "/executionEnvironment",
        }
    }

    /// Name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        &self.path()[1..]
    }

    /// Route a request line. Query strings are ignored.
    pub fn resolve(method: &Method, target: &str) -> Option<Self> {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        Self::ALL
            .into_iter()
            .find(|kind| kind.method() == *method && kind.path() == path)
    }

    /// Option names the command recognizes, case-folded.
    pub fn option_names(&self) -> &'static [&'static str] {
        match self {
            Self::Reset => ResetOptions::NAMES,
            Self::Stop => StopOptions::NAMES,
            Self::Reconfigure => ReconfigureOptions::NAMES,
            Self::WaitActiveRequests => WaitActiveRequestsOptions::NAMES,
            _ => &[],
        }
    }

    pub fn accepts_option(&self, name: &str) -> bool {
        self.option_names().contains(&name)
    }

    /// Only reset carries a body: the new proxy configuration.
    pub fn takes_body(&self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Whether the command changes the instance and needs the operation guard.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Reset | Self::Stop | Self::Restart | Self::Reconfigure
        )
    }
}

/// A fully parsed command with its typed options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset {
        options: ResetOptions,
        configuration: String,
    },
    Check,
    Stop(StopOptions),
    Restart,
    Reconfigure(ReconfigureOptions),
    FinishCaching,
    WaitActiveRequests(WaitActiveRequestsOptions),
    GetAccessRecords,
    ExecutionEnvironment,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Reset { .. } => CommandKind::Reset,
            Self::Check => CommandKind::Check,
            Self::Stop(_) => CommandKind::Stop,
            Self::Restart => CommandKind::Restart,
            Self::Reconfigure(_) => CommandKind::Reconfigure,
            Self::FinishCaching => CommandKind::FinishCaching,
            Self::WaitActiveRequests(_) => CommandKind::WaitActiveRequests,
            Self::GetAccessRecords => CommandKind::GetAccessRecords,
            Self::ExecutionEnvironment => CommandKind::ExecutionEnvironment,
        }
    }
}
