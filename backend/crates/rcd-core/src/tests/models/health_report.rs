use crate::HealthReport;

use serde_json::json;

#[test]
fn given_new_report_when_serialized_then_empty_problems() {
    let report = HealthReport::new();

    assert!(report.is_clean());
    assert_eq!(serde_json::to_value(&report).unwrap(), json!({ "problems": [] }));
}

#[test]
fn given_problems_and_extras_when_serialized_then_extras_flattened() {
    let mut report = HealthReport::new();
    report.add_problem("ERROR: cannot open swap log");
    report.set_extra("accessRecords", 7);

    assert!(!report.is_clean());
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({ "problems": ["ERROR: cannot open swap log"], "accessRecords": 7 })
    );
}
