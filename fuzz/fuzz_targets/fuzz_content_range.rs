#![no_main]

use byterange::ContentRange;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        if let Ok(range) = ContentRange::parse("fuzz", value) {
            assert!(range.size > 0);
            assert!(range.end_exclusive() > range.start);
        }
    }
});
