#![no_main]

use libfuzzer_sys::fuzz_target;
use source_map::mappings::{encode_mappings, parse_mappings};

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Index bounds are checked against the map's arrays; lift them here so
    // arbitrary (but well-formed) mappings strings survive the parse.
    let Ok(mut entries) = parse_mappings(text, usize::MAX, usize::MAX) else {
        return;
    };

    // The encoder expects generated order; the decoder does not require it.
    entries.sort_by_key(|e| e.generated);

    let encoded = encode_mappings(&entries);
    let reparsed =
        parse_mappings(&encoded, usize::MAX, usize::MAX).expect("re-encoded mappings parse");
    assert_eq!(reparsed, entries);
});
