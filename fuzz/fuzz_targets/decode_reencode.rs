#![no_main]

use libfuzzer_sys::fuzz_target;

// Accepted inputs must re-encode successfully, and the re-encoded form is a
// fixpoint: encoding its own decode reproduces it byte for byte.
fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = ccf::decode(data) {
        let again = ccf::encode(&decoded.pool, &decoded.ty, &decoded.value)
            .expect("decoded message must re-encode");
        let redecoded = ccf::decode(&again).expect("re-encoded message must decode");
        let stable = ccf::encode(&redecoded.pool, &redecoded.ty, &redecoded.value)
            .expect("re-encoded message must re-encode");
        assert_eq!(again, stable);
    }
});
