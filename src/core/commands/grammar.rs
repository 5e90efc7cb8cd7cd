// src/core/commands/grammar.rs

//! Compiled patterns for the strict command grammar.
//!
//! Every pattern is anchored: an argument either matches its verb's pattern
//! in full or the line is rejected before any store access. The zone pattern
//! admits embedded newlines, so a whole multi-line zone payload is a single
//! argument.

use lazy_static::lazy_static;
use regex::Regex;

/// Device names: `BB_` followed by one or more digits.
pub const DEVICE_PATTERN: &str = "BB_[0-9]+";

/// A coordinate pair: `<degrees>[.<frac>](N|S),<degrees>[.<frac>](E|W)`.
pub const LOCATION_PATTERN: &str = r"[0-9]+(?:\.[0-9]+)?[NS],[0-9]+(?:\.[0-9]+)?[EW]";

/// A zone radius: `<digits>[.<frac>]`.
pub const RADIUS_PATTERN: &str = r"[0-9]+(?:\.[0-9]+)?";

lazy_static! {
    static ref DEVICE_RE: Regex = anchored(DEVICE_PATTERN);
    static ref LOCATION_RE: Regex = anchored(LOCATION_PATTERN);
    static ref ZONE_RE: Regex = anchored(&zone_pattern());
    static ref SET_LOCATION_ARGS_RE: Regex =
        anchored(&format!("({DEVICE_PATTERN}) ({LOCATION_PATTERN})"));
    static ref SET_ZONE_ARGS_RE: Regex =
        anchored(&format!("({DEVICE_PATTERN}) ({})", zone_pattern()));
}

/// One or more `<location>,<radius>` tuples joined by newlines.
fn zone_pattern() -> String {
    let tuple = format!("{LOCATION_PATTERN},{RADIUS_PATTERN}");
    format!("{tuple}(?:\n{tuple})*")
}

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})$")).unwrap()
}

/// Whether `name` is a well-formed device name.
pub fn is_device_name(name: &str) -> bool {
    DEVICE_RE.is_match(name)
}

/// Whether `text` is a well-formed coordinate pair.
pub fn is_location(text: &str) -> bool {
    LOCATION_RE.is_match(text)
}

/// Whether `text` is a well-formed zone payload.
pub fn is_zone_text(text: &str) -> bool {
    ZONE_RE.is_match(text)
}

/// Splits `setLocation` argument text into `(device, location)` when it
/// matches the pattern in full.
pub fn set_location_args(args: &str) -> Option<(String, String)> {
    SET_LOCATION_ARGS_RE
        .captures(args)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Splits `setZone` argument text into `(device, zone_text)` when it matches
/// the pattern in full.
pub fn set_zone_args(args: &str) -> Option<(String, String)> {
    SET_ZONE_ARGS_RE
        .captures(args)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}
