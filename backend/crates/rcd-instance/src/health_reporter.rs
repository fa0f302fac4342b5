use crate::{
    InstanceResult, LogEvent, access_log::count_records, log_file::read_log,
    memory_checker_log::scan_memory_checker_log,
};

use rcd_config::Config;
use rcd_core::HealthReport;

use std::path::PathBuf;

use log::debug;

/// Extra report field holding the access log's transaction count.
pub const ACCESS_RECORDS_FIELD: &str = "accessRecords";

/// Builds the health report attached to every successful response.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    main_log: PathBuf,
    access_log: PathBuf,
    memory_checker_log: PathBuf,
    max_problems: usize,
}

impl HealthReporter {
    pub fn new(
        main_log: PathBuf,
        access_log: PathBuf,
        memory_checker_log: PathBuf,
        max_problems: usize,
    ) -> Self {
        Self {
            main_log,
            access_log,
            memory_checker_log,
            max_problems,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.main_log(),
            config.access_log(),
            config.memory_checker_log(),
            config.health.max_problems,
        )
    }

    /// Scan the logs of the current deployment.
    ///
    /// `require_complete_diagnostics` is set once the instance has exited:
    /// only then must the memory checker have written its summaries.
    pub async fn report(
        &self,
        memory_checker_used: bool,
        require_complete_diagnostics: bool,
    ) -> InstanceResult<HealthReport> {
        let mut problems = Vec::new();

        if let Some(text) = read_log(&self.main_log).await? {
            problems.extend(
                text.lines()
                    .filter(|line| LogEvent::classify(line).is_some_and(|e| e.is_problem()))
                    .map(str::to_string),
            );
        }

        if memory_checker_used {
            let findings = read_log(&self.memory_checker_log)
                .await?
                .map(|text| scan_memory_checker_log(&text))
                .unwrap_or_default();

            if require_complete_diagnostics && findings.summaries == 0 {
                problems.push(format!(
                    "memory checker log {} has no error summary",
                    self.memory_checker_log.display()
                ));
            }
            problems.extend(findings.problems);
        }

        let mut report = HealthReport::new();
        let total = problems.len();
        for problem in problems.into_iter().take(self.max_problems) {
            report.add_problem(problem);
        }
        if total > self.max_problems {
            report.add_problem(format!(
                "{} more problems suppressed",
                total - self.max_problems
            ));
        }

        report.set_extra(ACCESS_RECORDS_FIELD, count_records(&self.access_log).await?);

        debug!(
            "Health report: {} problem(s), {} shown",
            total,
            report.problems.len()
        );

        Ok(report)
    }
}
