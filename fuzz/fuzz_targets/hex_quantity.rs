#![no_main]

use chain_event_listener::utils::{decode_hex_data, parse_hex_quantity};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let _ = parse_hex_quantity(&input);
    let _ = decode_hex_data(&input);
});
