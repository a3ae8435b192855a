#![no_main]

use libfuzzer_sys::fuzz_target;
use source_map::vlq;

fuzz_target!(|data: &[u8]| {
    // Decode as many values as the input yields, then re-encode them; the
    // canonical encoding must decode back to the same values.
    let mut cursor = 0;
    let mut values = Vec::new();
    while cursor < data.len() {
        match vlq::decode(data, &mut cursor) {
            Ok(value) => values.push(value),
            Err(_) => break,
        }
    }

    let mut encoded = String::new();
    for &value in &values {
        vlq::encode(value, &mut encoded);
    }

    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    for &value in &values {
        let decoded = vlq::decode(bytes, &mut cursor).expect("canonical encoding decodes");
        assert_eq!(decoded, value);
    }
    assert_eq!(cursor, bytes.len());
});
