#![no_main]

use libfuzzer_sys::fuzz_target;
use revivir::event::{ForensicEvent, Payload};

fuzz_target!(|data: &[u8]| {
    // Non-UTF-8 inputs are skipped; the JSON layer rejects them anyway
    if let Ok(input) = std::str::from_utf8(data) {
        // Payload parsing and the coercing accessors must never panic,
        // whatever shape the JSON takes
        if let Ok(payload) = serde_json::from_str::<Payload>(input) {
            let _ = payload.int_or("port", -1);
            let _ = payload.str_or("image", "<unknown>");
            let _ = payload.canonical_json();

            let event = ForensicEvent::new(0, 0, "process_start", payload);
            let _ = event.stable_repr();
        }
    }
});
