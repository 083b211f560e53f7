#![no_main]

use kwsync_core::{TOTAL_SLOT_CAPACITY, attributes, slots};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(regions) = slots::scan_slots(s, TOTAL_SLOT_CAPACITY) {
            // Regions must be real, in-bounds slices of the input
            for region in regions {
                let _ = &s[region.content];
            }
        }
        if let Ok(table) = attributes::parse_table(s) {
            let counts: Vec<(&str, usize)> = table.rows.iter().map(|r| (r.lexer, r.count.saturating_add(1))).collect();
            let _ = attributes::synchronize(s, &counts);
        }
    }
});
