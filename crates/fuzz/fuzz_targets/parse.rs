#![no_main]

use libfuzzer_sys::fuzz_target;
use source_map::{Bias, Position, SourceMap};

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    // Malformed input must come back as Err, never as a panic.
    if let Ok(map) = SourceMap::from_slice(data) {
        for bias in [Bias::GreatestLowerBound, Bias::LeastUpperBound] {
            let _ = map.original_position_for(Position::new(0, 0), bias);
            let _ = map.original_position_for(Position::new(u32::MAX, u32::MAX), bias);
        }
        if let Some(source) = map.sources().first() {
            let source = source.clone();
            let _ = map.generated_position_for(&source, Position::new(0, 0), Bias::default());
            let _ = map.all_generated_positions_for(&source, 0, None);
            let _ = map.source_content_for(&source);
        }
    }
});
