use crate::{AccessRecord, CoreError};

use googletest::assert_that;
use googletest::prelude::{anything, err, pat};

const LINE: &str = "1286536308.779    180 192.168.0.224 TCP_MISS/200 411 GET http://example.com/ - HIER_DIRECT/93.184.216.34 text/html";

#[test]
fn given_native_line_when_parsed_then_fields_extracted() {
    let record = AccessRecord::parse(LINE).unwrap();

    assert_eq!(record.timestamp.timestamp(), 1286536308);
    assert_eq!(record.timestamp.timestamp_subsec_millis(), 779);
    assert_eq!(record.elapsed_ms, 180);
    assert_eq!(record.client, "192.168.0.224");
    assert_eq!(record.result_code, "TCP_MISS");
    assert_eq!(record.status, 200);
    assert_eq!(record.bytes, 411);
    assert_eq!(record.method, "GET");
    assert_eq!(record.url, "http://example.com/");
    assert_eq!(record.raw, LINE);
}

#[test]
fn given_truncated_line_when_parsed_then_error() {
    let result = AccessRecord::parse("1286536308.779 180 192.168.0.224");

    assert_that!(
        result,
        err(pat!(CoreError::MalformedAccessRecord { .. }))
    );
}

#[test]
fn given_result_code_without_status_when_parsed_then_error() {
    let result = AccessRecord::parse("1286536308.779 180 10.0.0.1 TCP_MISS 411 GET http://a/");

    assert_that!(
        result,
        err(pat!(CoreError::MalformedAccessRecord {
            location: anything(),
            ..
        }))
    );
}
