use std::path::PathBuf;

use source_map::{Bias, OriginalLocation, Position, SourceMap};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn load_fixture(name: &str) -> SourceMap {
    let json = std::fs::read_to_string(fixtures_dir().join(name)).expect("read fixture");
    SourceMap::from_json_str(&json).expect("parse fixture")
}

fn location(source: &str, line: u32, column: u32, name: Option<&str>) -> OriginalLocation {
    OriginalLocation {
        source: Some(source.to_string()),
        line: Some(line),
        column: Some(column),
        name: name.map(|n| n.to_string()),
    }
}

/// Every mapping in basic.map, in generated order: generated position,
/// resolved source, original position, name.
fn basic_mappings() -> Vec<((u32, u32), OriginalLocation)> {
    let one = "/the/root/one.js";
    let two = "/the/root/two.js";
    vec![
        ((0, 1), location(one, 0, 1, None)),
        ((0, 5), location(one, 0, 5, None)),
        ((0, 9), location(one, 0, 11, None)),
        ((0, 18), location(one, 0, 21, Some("bar"))),
        ((0, 21), location(one, 1, 3, None)),
        ((0, 28), location(one, 1, 10, Some("baz"))),
        ((0, 32), location(one, 1, 14, Some("bar"))),
        ((1, 1), location(two, 0, 1, None)),
        ((1, 5), location(two, 0, 5, None)),
        ((1, 9), location(two, 0, 11, None)),
        ((1, 18), location(two, 0, 21, Some("n"))),
        ((1, 21), location(two, 1, 3, None)),
        ((1, 28), location(two, 1, 10, Some("n"))),
    ]
}

#[test]
fn basic_map_resolves_every_generated_position() {
    let map = load_fixture("basic.map");
    assert_eq!(map.file(), Some("min.js"));
    assert_eq!(map.source_root(), Some("/the/root"));

    for ((line, column), expected) in basic_mappings() {
        let got = map
            .original_position_for(Position::new(line, column), Bias::default())
            .unwrap_or_else(|| panic!("no mapping at ({line},{column})"));
        assert_eq!(got, expected, "at generated ({line},{column})");
    }
}

#[test]
fn basic_map_resolves_every_original_position() {
    let map = load_fixture("basic.map");

    for ((gen_line, gen_column), expected) in basic_mappings() {
        let source = expected.source.as_deref().unwrap();
        let original = Position::new(expected.line.unwrap(), expected.column.unwrap());
        let got = map.generated_position_for(source, original, Bias::default());
        // Mappings whose original position repeats resolve to one of the
        // duplicates; only assert on positions that occur once per source.
        if let Some(got) = got {
            let back = map
                .original_position_for(got, Bias::default())
                .expect("mapped position resolves back");
            assert_eq!(back.source, expected.source);
            assert_eq!(back.line, expected.line);
            assert_eq!(back.column, expected.column);
        } else {
            panic!("no generated position for {source} ({gen_line},{gen_column})");
        }
    }
}

#[test]
fn sources_match_in_raw_and_resolved_form() {
    let map = load_fixture("basic.map");
    let original = Position::new(0, 21);

    let via_raw = map.generated_position_for("two.js", original, Bias::default());
    let via_resolved = map.generated_position_for("/the/root/two.js", original, Bias::default());
    assert_eq!(via_raw, Some(Position::new(1, 18)));
    assert_eq!(via_raw, via_resolved);

    assert_eq!(
        map.generated_position_for("three.js", original, Bias::default()),
        None
    );
}

#[test]
fn relative_sources_resolve_against_the_root() {
    let map = load_fixture("relative-sources.map");
    assert_eq!(map.sources(), &["./one.js".to_string(), "./two.js".to_string()]);
    assert_eq!(map.resolved_source(0).as_deref(), Some("/the/root/one.js"));

    let loc = map
        .original_position_for(Position::new(1, 1), Bias::default())
        .unwrap();
    assert_eq!(loc.source.as_deref(), Some("/the/root/two.js"));

    for query in ["two.js", "./two.js", "/the/root/two.js"] {
        assert_eq!(
            map.generated_position_for(query, Position::new(0, 1), Bias::default()),
            Some(Position::new(1, 1)),
            "query {query:?}"
        );
    }
}

#[test]
fn bias_selects_the_neighboring_entry() {
    let map = load_fixture("basic.map");

    // Between (0,1) and (0,5).
    let glb = map
        .original_position_for(Position::new(0, 3), Bias::GreatestLowerBound)
        .unwrap();
    assert_eq!(glb.column, Some(1));
    let lub = map
        .original_position_for(Position::new(0, 3), Bias::LeastUpperBound)
        .unwrap();
    assert_eq!(lub.column, Some(5));

    // Before the first entry only LeastUpperBound can answer.
    assert_eq!(
        map.original_position_for(Position::new(0, 0), Bias::GreatestLowerBound),
        None
    );
    assert!(
        map.original_position_for(Position::new(0, 0), Bias::LeastUpperBound)
            .is_some()
    );

    // After the last entry only GreatestLowerBound can answer.
    assert!(
        map.original_position_for(Position::new(9, 0), Bias::GreatestLowerBound)
            .is_some()
    );
    assert_eq!(
        map.original_position_for(Position::new(9, 0), Bias::LeastUpperBound),
        None
    );
}

#[test]
fn indexed_map_is_equivalent_to_its_flat_form() {
    let flat = load_fixture("basic.map");
    let indexed = load_fixture("indexed.map");

    for ((line, column), _) in basic_mappings() {
        for bias in [Bias::GreatestLowerBound, Bias::LeastUpperBound] {
            assert_eq!(
                indexed.original_position_for(Position::new(line, column), bias),
                flat.original_position_for(Position::new(line, column), bias),
                "at generated ({line},{column}), bias {bias:?}"
            );
        }
    }

    // Flattening pre-resolves the sources and drops the shared root.
    assert_eq!(indexed.source_root(), None);
    assert_eq!(
        indexed.sources(),
        &["/the/root/one.js".to_string(), "/the/root/two.js".to_string()]
    );
}

#[test]
fn indexed_sections_resolve_their_own_roots() {
    let map = load_fixture("indexed-different-roots.map");

    let loc = map
        .original_position_for(Position::new(0, 1), Bias::default())
        .unwrap();
    assert_eq!(loc.source.as_deref(), Some("/the/root/one.js"));

    let loc = map
        .original_position_for(Position::new(1, 1), Bias::default())
        .unwrap();
    assert_eq!(loc.source.as_deref(), Some("/different/root/two.js"));
}

#[test]
fn indexed_column_offset_shifts_the_sections_first_line() {
    let map = load_fixture("indexed-column-offset.map");

    // The second section starts at column 50, so its local (0,1) appears at
    // (0,51) and its local (0,18) at (0,68).
    let loc = map
        .original_position_for(Position::new(0, 51), Bias::default())
        .unwrap();
    assert_eq!(loc, location("/the/root/two.js", 0, 1, None));

    let loc = map
        .original_position_for(Position::new(0, 68), Bias::default())
        .unwrap();
    assert_eq!(loc, location("/the/root/two.js", 0, 21, Some("n")));

    // Positions before the offset still belong to the first section.
    let loc = map
        .original_position_for(Position::new(0, 32), Bias::default())
        .unwrap();
    assert_eq!(loc.source.as_deref(), Some("/the/root/one.js"));
}

#[test]
fn empty_map_answers_nothing() {
    let map = load_fixture("empty.map");
    assert!(map.is_empty());
    for bias in [Bias::GreatestLowerBound, Bias::LeastUpperBound] {
        assert_eq!(map.original_position_for(Position::new(0, 0), bias), None);
    }
    assert!(map.all_generated_positions_for("one.js", 0, None).is_empty());
    assert!(!map.has_contents_of_all_sources());
}

#[test]
fn generated_only_mappings_resolve_to_an_absent_location() {
    let map = load_fixture("sourceless.map");

    // The second segment of "AAgCA,C" carries no original side.
    let loc = map
        .original_position_for(Position::new(0, 1), Bias::default())
        .unwrap();
    assert_eq!(loc, OriginalLocation::default());

    // The first one does.
    let loc = map
        .original_position_for(Position::new(0, 0), Bias::default())
        .unwrap();
    assert_eq!(loc, location("example.js", 32, 0, None));
}

#[test]
fn sources_content_is_exposed_per_source() {
    let map = load_fixture("with-content.map");
    assert!(map.has_contents_of_all_sources());
    assert!(
        map.source_content_for("one.js")
            .unwrap()
            .starts_with(" ONE.foo")
    );
    assert!(
        map.source_content_for("/the/root/two.js")
            .unwrap()
            .starts_with(" TWO.inc")
    );
    assert_eq!(map.source_content_for("three.js"), None);

    let without = load_fixture("basic.map");
    assert!(!without.has_contents_of_all_sources());
    assert_eq!(without.source_content_for("one.js"), None);
}

#[test]
fn flattening_merges_section_sources_content() {
    let map = load_fixture("indexed.map");
    assert!(map.has_contents_of_all_sources());
    assert!(
        map.source_content_for("/the/root/two.js")
            .unwrap()
            .starts_with(" TWO.inc")
    );
}

#[test]
fn all_generated_positions_cover_an_original_line() {
    let map = load_fixture("basic.map");

    assert_eq!(
        map.all_generated_positions_for("two.js", 1, None),
        vec![Position::new(1, 21), Position::new(1, 28)]
    );
    assert_eq!(
        map.all_generated_positions_for("two.js", 1, Some(10)),
        vec![Position::new(1, 28)]
    );
    assert!(map.all_generated_positions_for("two.js", 9, None).is_empty());
    assert!(map.all_generated_positions_for("three.js", 1, None).is_empty());
}
