//! Parsing and encoding of the compact `mappings` string.
//!
//! The `mappings` field is `;`-separated per generated line and `,`-separated
//! into segments within a line. Each segment holds 1, 4, or 5 VLQ values:
//!
//! - 1 value: generated-column delta only (a generated-only entry),
//! - 4 values: plus source-index, original-line, and original-column deltas,
//! - 5 values: the above plus a name-index delta.
//!
//! Every value is a delta against a running counter. The generated-column
//! counter resets at each `;`; the source, original-line, original-column,
//! and name counters persist across generated lines and reset only at the
//! start of the whole string.
//!
//! Invariants:
//!
//! - Decoding is eager and fail-fast: any malformed segment rejects the whole
//!   string, so queries can never surface a decode error later.
//! - Source and name indices are validated against the surrounding map here,
//!   as are counters that go negative after applying a delta.

use crate::{Error, vlq};

/// A position in either the generated output or an original source.
///
/// Lines and columns are 0-based. The derived ordering is lexicographic
/// `(line, column)`, which is the sort key for the generated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The original-side fields of a mapping entry.
///
/// The nesting encodes the segment grammar: an original line/column can only
/// exist together with a source, and a name additionally requires a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginalPosition {
    /// Index into the map's `sources` array.
    pub source: u32,
    pub line: u32,
    pub column: u32,
    /// Index into the map's `names` array, if the entry carries one.
    pub name: Option<u32>,
}

/// One correspondence point between a generated and an original position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    pub generated: Position,
    /// `None` for generated-only (1-field) entries.
    pub original: Option<OriginalPosition>,
}

/// The five running counters threaded through decoding.
///
/// Kept as an explicit struct (rather than loose locals) so the stateful
/// delta rules stay in one place and the decoder is reentrant.
#[derive(Debug, Clone, Copy, Default)]
struct DecodeState {
    generated_column: i64,
    source: i64,
    original_line: i64,
    original_column: i64,
    name: i64,
}

/// Decode a whole `mappings` string into entries in encoding order.
///
/// `sources_len` and `names_len` bound the index fields; out-of-range
/// references are rejected here rather than at query time.
pub fn parse_mappings(
    mappings: &str,
    sources_len: usize,
    names_len: usize,
) -> Result<Vec<MappingEntry>, Error> {
    let mut entries = Vec::new();
    let mut state = DecodeState::default();

    for (line_idx, line) in mappings.split(';').enumerate() {
        state.generated_column = 0;
        if line.is_empty() {
            continue;
        }
        let generated_line = checked_u32(line_idx as i64, "generated line")?;
        for segment in line.split(',') {
            entries.push(parse_segment(
                segment.as_bytes(),
                generated_line,
                &mut state,
                sources_len,
                names_len,
            )?);
        }
    }

    Ok(entries)
}

/// Decode one `,`-delimited segment and apply its deltas to `state`.
fn parse_segment(
    bytes: &[u8],
    generated_line: u32,
    state: &mut DecodeState,
    sources_len: usize,
    names_len: usize,
) -> Result<MappingEntry, Error> {
    let mut fields = [0i64; 5];
    let mut count = 0usize;
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        let value = vlq::decode(bytes, &mut cursor)?;
        if count < fields.len() {
            fields[count] = value;
        }
        count += 1;
    }

    if !matches!(count, 1 | 4 | 5) {
        return Err(Error::InvalidSegmentLength(count));
    }

    state.generated_column = add_delta(state.generated_column, fields[0], "generated column")?;
    let generated = Position {
        line: generated_line,
        column: checked_u32(state.generated_column, "generated column")?,
    };

    let original = if count == 1 {
        None
    } else {
        state.source = add_delta(state.source, fields[1], "source")?;
        state.original_line = add_delta(state.original_line, fields[2], "original line")?;
        state.original_column = add_delta(state.original_column, fields[3], "original column")?;

        let source = checked_index(state.source, sources_len, "source")?;
        let line = checked_u32(state.original_line, "original line")?;
        let column = checked_u32(state.original_column, "original column")?;

        let name = if count == 5 {
            state.name = add_delta(state.name, fields[4], "name")?;
            Some(checked_index(state.name, names_len, "name")?)
        } else {
            None
        };

        Some(OriginalPosition {
            source,
            line,
            column,
            name,
        })
    };

    Ok(MappingEntry {
        generated,
        original,
    })
}

fn add_delta(counter: i64, delta: i64, field: &'static str) -> Result<i64, Error> {
    counter
        .checked_add(delta)
        .ok_or(Error::FieldOutOfRange { field })
}

fn checked_u32(value: i64, field: &'static str) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| Error::FieldOutOfRange { field })
}

fn checked_index(value: i64, len: usize, what: &'static str) -> Result<u32, Error> {
    let index = u32::try_from(value).map_err(|_| Error::IndexOutOfRange {
        what,
        index: value,
        len,
    })?;
    if (index as usize) >= len {
        return Err(Error::IndexOutOfRange {
            what,
            index: value,
            len,
        });
    }
    Ok(index)
}

/// Encode `entries` into the compact `mappings` string.
///
/// `entries` must already be sorted by generated position; ties keep their
/// slice order. [`crate::builder::SourceMapBuilder`] sorts before calling
/// this.
pub fn encode_mappings(entries: &[MappingEntry]) -> String {
    let mut out = String::new();

    let mut current_line: u32 = 0;
    let mut generated_column: i64 = 0;
    let mut source: i64 = 0;
    let mut original_line: i64 = 0;
    let mut original_column: i64 = 0;
    let mut name: i64 = 0;
    let mut first_in_line = true;

    for entry in entries {
        while current_line < entry.generated.line {
            out.push(';');
            current_line += 1;
            generated_column = 0;
            first_in_line = true;
        }
        if !first_in_line {
            out.push(',');
        }
        first_in_line = false;

        vlq::encode(i64::from(entry.generated.column) - generated_column, &mut out);
        generated_column = i64::from(entry.generated.column);

        if let Some(original) = entry.original {
            vlq::encode(i64::from(original.source) - source, &mut out);
            source = i64::from(original.source);

            vlq::encode(i64::from(original.line) - original_line, &mut out);
            original_line = i64::from(original.line);

            vlq::encode(i64::from(original.column) - original_column, &mut out);
            original_column = i64::from(original.column);

            if let Some(n) = original.name {
                vlq::encode(i64::from(n) - name, &mut out);
                name = i64::from(n);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The `mappings` string of the canonical two-source fixture
    /// (`one.js`/`two.js` minified into `min.js`).
    const FIXTURE_MAPPINGS: &str =
        "CAAC,IAAI,IAAM,SAAUA,GAClB,OAAOC,IAAID;CCDb,IAAI,IAAM,SAAUE,GAClB,OAAOA";

    fn full(generated: (u32, u32), source: u32, orig: (u32, u32), name: Option<u32>) -> MappingEntry {
        MappingEntry {
            generated: Position::new(generated.0, generated.1),
            original: Some(OriginalPosition {
                source,
                line: orig.0,
                column: orig.1,
                name,
            }),
        }
    }

    #[test]
    fn parses_a_single_full_segment() {
        let entries = parse_mappings("AAAA", 1, 0).unwrap();
        assert_eq!(entries, vec![full((0, 0), 0, (0, 0), None)]);
    }

    #[test]
    fn parses_the_canonical_fixture() {
        let entries = parse_mappings(FIXTURE_MAPPINGS, 2, 3).unwrap();
        assert_eq!(entries.len(), 13);

        // Spot checks across both generated lines. The source/original-line/
        // original-column/name counters persist across the ';' boundary.
        assert_eq!(entries[0], full((0, 1), 0, (0, 1), None));
        assert_eq!(entries[3], full((0, 18), 0, (0, 21), Some(0)));
        assert_eq!(entries[4], full((0, 21), 0, (1, 3), None));
        assert_eq!(entries[5], full((0, 28), 0, (1, 10), Some(1)));
        assert_eq!(entries[6], full((0, 32), 0, (1, 14), Some(0)));
        assert_eq!(entries[7], full((1, 1), 1, (0, 1), None));
        assert_eq!(entries[10], full((1, 18), 1, (0, 21), Some(2)));
        assert_eq!(entries[12], full((1, 28), 1, (1, 10), Some(2)));
    }

    #[test]
    fn parses_generated_only_segments() {
        // "AAgCA,C": one full segment, then a 1-field (sourceless) segment.
        let entries = parse_mappings("AAgCA,C", 1, 0).unwrap();
        assert_eq!(
            entries,
            vec![
                full((0, 0), 0, (32, 0), None),
                MappingEntry {
                    generated: Position::new(0, 1),
                    original: None,
                },
            ]
        );
    }

    #[test]
    fn empty_string_and_bare_separators_produce_no_entries() {
        assert_eq!(parse_mappings("", 0, 0).unwrap(), vec![]);
        assert_eq!(parse_mappings(";;;", 0, 0).unwrap(), vec![]);
    }

    #[test]
    fn empty_lines_advance_the_generated_line() {
        let entries = parse_mappings(";;AAAA", 1, 0).unwrap();
        assert_eq!(entries, vec![full((2, 0), 0, (0, 0), None)]);
    }

    #[test]
    fn generated_column_resets_per_line_but_other_counters_persist() {
        // Line 0 advances the original position to (0, 4); line 1 encodes a
        // zero delta everywhere, so it continues from those counters.
        let entries = parse_mappings("IAAI;AAAA", 1, 0).unwrap();
        assert_eq!(
            entries,
            vec![full((0, 4), 0, (0, 4), None), full((1, 0), 0, (0, 4), None)]
        );
    }

    #[test]
    fn rejects_bad_segment_field_counts() {
        assert!(matches!(
            parse_mappings("AAA", 1, 0),
            Err(Error::InvalidSegmentLength(3))
        ));
        assert!(matches!(
            parse_mappings("AA", 1, 0),
            Err(Error::InvalidSegmentLength(2))
        ));
        assert!(matches!(
            parse_mappings("AAAAAA", 1, 1),
            Err(Error::InvalidSegmentLength(6))
        ));
        // An empty segment between commas decodes to zero fields.
        assert!(matches!(
            parse_mappings("AAAA,,AAAA", 1, 0),
            Err(Error::InvalidSegmentLength(0))
        ));
    }

    #[test]
    fn rejects_malformed_vlq_data() {
        assert!(matches!(
            parse_mappings("A*AA", 1, 0),
            Err(Error::InvalidBase64('*'))
        ));
        assert!(matches!(
            parse_mappings("g", 1, 0),
            Err(Error::TruncatedVlq)
        ));
    }

    #[test]
    fn rejects_negative_running_counters() {
        // Generated column delta of -1 at the start of a line.
        assert!(matches!(
            parse_mappings("D", 0, 0),
            Err(Error::FieldOutOfRange {
                field: "generated column"
            })
        ));
        // Original line going negative.
        assert!(matches!(
            parse_mappings("AADA", 1, 0),
            Err(Error::FieldOutOfRange {
                field: "original line"
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!(matches!(
            parse_mappings("AAAA", 0, 0),
            Err(Error::IndexOutOfRange {
                what: "source",
                index: 0,
                len: 0,
            })
        ));
        assert!(matches!(
            parse_mappings("AAAAC", 1, 1),
            Err(Error::IndexOutOfRange { what: "name", .. })
        ));
    }

    #[test]
    fn encode_roundtrips_the_canonical_fixture() {
        let entries = parse_mappings(FIXTURE_MAPPINGS, 2, 3).unwrap();
        assert_eq!(encode_mappings(&entries), FIXTURE_MAPPINGS);
    }

    #[test]
    fn encode_emits_semicolons_for_skipped_lines() {
        let entries = vec![full((2, 0), 0, (0, 0), None)];
        assert_eq!(encode_mappings(&entries), ";;AAAA");
    }

    #[test]
    fn encode_handles_generated_only_entries() {
        let entries = parse_mappings("AAgCA,C", 1, 0).unwrap();
        assert_eq!(encode_mappings(&entries), "AAgCA,C");
    }
}
