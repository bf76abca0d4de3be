#![no_main]

use libfuzzer_sys::fuzz_target;

// Decoding arbitrary bytes must either fail with a typed error or produce
// a value; it must never panic.
fuzz_target!(|data: &[u8]| {
    let _ = ccf::decode(data);
});
