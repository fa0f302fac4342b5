use crate::Deployment;

fn deployment(workers: u32, diskers: u32, ports: &[u16]) -> Deployment {
    Deployment {
        workers,
        diskers,
        ..Deployment::new(ports.to_vec())
    }
}

#[test]
fn given_single_worker_when_computing_expectations_then_no_coordinator() {
    let d = deployment(1, 0, &[3128]);

    assert!(!d.has_coordinator());
    assert!(!d.waits_for_kids());
    assert_eq!(d.expected_reconfiguration_markers(), 1);
    assert_eq!(d.expected_accepting_markers(), 1);
}

#[test]
fn given_two_workers_no_diskers_when_computing_expectations_then_coordinator_counted() {
    let d = deployment(2, 0, &[3128]);

    assert!(d.has_coordinator());
    assert_eq!(d.expected_reconfiguration_markers(), 3);
    assert_eq!(d.expected_accepting_markers(), 2);
    assert_eq!(d.expected_kid_sections(), 2);
}

#[test]
fn given_workers_diskers_and_ports_when_computing_expectations_then_products_used() {
    let d = deployment(3, 2, &[3128, 3129]);

    assert_eq!(d.kids(), 5);
    assert_eq!(d.expected_reconfiguration_markers(), 6);
    assert_eq!(d.expected_accepting_markers(), 6);
    assert_eq!(d.expected_kid_sections(), 5);
}

#[test]
fn given_one_worker_one_disker_when_computing_expectations_then_coordinator_exists() {
    let d = deployment(1, 1, &[3128]);

    assert!(d.waits_for_kids());
    assert_eq!(d.expected_reconfiguration_markers(), 3);
    assert_eq!(d.expected_accepting_markers(), 1);
}

#[test]
fn given_largest_counts_when_computing_expectations_then_no_overflow() {
    let d = deployment(u32::MAX, u32::MAX, &[3128]);

    assert_eq!(d.kids(), 2 * u64::from(u32::MAX));
    assert_eq!(d.expected_reconfiguration_markers(), 2 * u64::from(u32::MAX) + 1);
    assert_eq!(d.expected_kid_sections(), 2 * u64::from(u32::MAX));
}
