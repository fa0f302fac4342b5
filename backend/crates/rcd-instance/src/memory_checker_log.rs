//! Findings in the memory checker's log.
//!
//! Every process the checker traces writes its lines prefixed with
//! `==<pid>==`, so records of concurrently exiting kids interleave. A record
//! runs from a `HEAP SUMMARY:` line to the same process's `ERROR SUMMARY:`
//! line.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub const RECORD_BEGIN: &str = "HEAP SUMMARY:";
pub const RECORD_END: &str = "ERROR SUMMARY:";

static PROCESS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^==(\d+)==\s?(.*)$").expect("Invalid process prefix pattern"));
static LEAKED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:definitely|indirectly) lost: ([\d,]+) bytes")
        .expect("Invalid leak pattern")
});
static ERRORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ERROR SUMMARY: ([\d,]+) errors?").expect("Invalid error summary pattern")
});
static FATAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"the 'impossible' happened|VALGRIND INTERNAL ERROR|memory management: out of memory")
        .expect("Invalid memory checker fatal pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCheckerFindings {
    pub problems: Vec<String>,
    /// Number of complete summaries seen; processes write one at exit
    pub summaries: usize,
}

pub fn scan_memory_checker_log(text: &str) -> MemoryCheckerFindings {
    let mut findings = MemoryCheckerFindings::default();
    let mut open: HashMap<&str, Vec<&str>> = HashMap::new();

    for line in text.lines() {
        let (pid, body) = PROCESS_PREFIX
            .captures(line)
            .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .unwrap_or(("", line));

        if FATAL.is_match(body) {
            findings.problems.push(line.to_string());
        }

        if body.contains(RECORD_BEGIN) {
            open.insert(pid, vec![line]);
            continue;
        }

        if let Some(record) = open.get_mut(pid) {
            record.push(line);
        }

        if body.contains(RECORD_END) {
            let record = open.remove(pid).unwrap_or_else(|| vec![line]);
            findings.summaries += 1;
            if record_has_findings(&record) {
                findings.problems.push(record.join("\n"));
            }
        }
    }

    findings
}

fn record_has_findings(record: &[&str]) -> bool {
    record.iter().any(|line| {
        LEAKED
            .captures(line)
            .or_else(|| ERRORS.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|count| count.as_str().replace(',', "").parse::<u64>().ok())
            .is_some_and(|count| count > 0)
    })
}
