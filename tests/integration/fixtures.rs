// tests/integration/fixtures.rs

//! Common test fixtures shared by the integration tests.

/// Device names used across tests.
pub const DEVICE1: &str = "BB_1";
pub const DEVICE2: &str = "BB_2";
#[allow(dead_code)]
pub const DEVICE3: &str = "BB_3";

/// Well-formed coordinate pairs.
pub const LOCATION1: &str = "0.324N,40.432E";
pub const LOCATION2: &str = "12S,170W";

/// A single-tuple zone payload.
pub const ZONE_SINGLE: &str = "0.324N,40.432E,4.13";

/// A zone payload spanning several newline-separated tuples.
pub const ZONE_MULTI: &str = "0.1N,0.2E,5.0\n3N,4W,1\n12.5S,120E,0.25";

/// Lines the grammar must drop without a reply.
#[allow(dead_code)]
pub const MALFORMED_LINES: &[&str] = &[
    "",
    "hello",
    "getLocation",
    "getLocation bb_1",
    "getLocation BB_1 extra",
    "setLocation BB_1",
    "setLocation BB_1 not-a-location",
    "setZone BB_1 1N,2E",
    "Goodbye now",
    "GETLOCATION BB_1",
];

/// Generates a unique device name for tests that need many devices.
#[allow(dead_code)]
pub fn unique_device(id: usize) -> String {
    format!("BB_{id}")
}
