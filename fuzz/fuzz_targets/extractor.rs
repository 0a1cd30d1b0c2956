#![no_main]

use libfuzzer_sys::fuzz_target;
use peicon::IconExtractor;

fuzz_target!(|data: &[u8]| {
    if let Ok(icon) = IconExtractor::new().extract_mem(data.to_vec()) {
        let _ = icon.to_image_bytes();
    }
});
