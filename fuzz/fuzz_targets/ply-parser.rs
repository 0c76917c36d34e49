#![no_main]

use libfuzzer_sys::fuzz_target;
use plyio::Reader;

fuzz_target!(|data: &[u8]| {
    // Only panics and crashes are interesting. Returning an error for
    // garbage input is perfectly fine, so the result is ignored.
    if let Ok(reader) = Reader::new(data) {
        let _ = reader.read_body();
    }
});
