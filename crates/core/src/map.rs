//! The decoded mapping table and its position-resolution queries.
//!
//! A [`SourceMap`] is built once from a raw map (or from flattened sections,
//! see [`crate::index`]) and is immutable afterwards. Queries borrow `&self`
//! only, so a frozen map can be shared across threads without
//! synchronization.
//!
//! Key ideas:
//!
//! - One owning store of entries, stable-sorted by generated position, plus a
//!   permutation array sorted by original position. Both views stay
//!   consistent because they index the same entries.
//! - Lookups are binary searches; the [`Bias`] only picks which neighbor to
//!   return when there is no exact match, never which half to search.
//! - When several entries share the exact queried position, the last one in
//!   encoding order wins under either bias; earlier duplicates remain
//!   reachable through nearest-match queries beside them.
//! - `sourceRoot` joining is computed on demand so [`SourceMap::sources`]
//!   always reflects the serialized form.

use crate::{
    Error, index,
    mappings::{self, MappingEntry, Position},
    path,
    raw::{RawMap, RawSourceMap},
};

/// Tie-breaking policy for nearest-match lookups when no exact match exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    /// Prefer the nearest entry at or before the queried position.
    #[default]
    GreatestLowerBound,
    /// Prefer the nearest entry at or after the queried position.
    LeastUpperBound,
}

/// A resolved original location returned by
/// [`SourceMap::original_position_for`].
///
/// All fields are `None` for generated-only entries; a name is only present
/// when the matched entry carried one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OriginalLocation {
    /// The source path, resolved against the map's `sourceRoot`.
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub name: Option<String>,
}

/// A parsed, frozen source map ready for lookups in both directions.
#[derive(Debug, Clone)]
pub struct SourceMap {
    file: Option<String>,
    source_root: Option<String>,
    sources: Vec<String>,
    sources_content: Option<Vec<Option<String>>>,
    names: Vec<String>,
    /// All entries, stable-sorted by generated position.
    entries: Vec<MappingEntry>,
    /// Indices into `entries` for entries with an original side, sorted by
    /// (source index, original line, original column).
    by_original: Vec<u32>,
}

impl SourceMap {
    /// Parse a map from JSON bytes, accepting both flat and indexed forms.
    ///
    /// All format and codec errors surface here; a map that loads
    /// successfully can never fail a later query.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        match RawMap::from_slice(bytes)? {
            RawMap::Flat(raw) => Self::from_raw(raw),
            RawMap::Indexed(raw) => index::flatten(raw),
        }
    }

    /// Parse a map from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Self::from_slice(json.as_bytes())
    }

    /// Build a queryable table from an already-deserialized flat map.
    pub fn from_raw(raw: RawSourceMap) -> Result<Self, Error> {
        if raw.version != 3 {
            return Err(Error::UnsupportedVersion(raw.version));
        }
        let entries = mappings::parse_mappings(&raw.mappings, raw.sources.len(), raw.names.len())?;
        Ok(Self::from_parts(
            raw.file,
            raw.source_root,
            raw.sources,
            raw.sources_content,
            raw.names,
            entries,
        ))
    }

    /// Freeze decoded entries into the dual-view table.
    pub(crate) fn from_parts(
        file: Option<String>,
        source_root: Option<String>,
        sources: Vec<String>,
        sources_content: Option<Vec<Option<String>>>,
        names: Vec<String>,
        mut entries: Vec<MappingEntry>,
    ) -> Self {
        // Stable: ties keep encoding order, which is what makes the
        // "later entry wins exact matches" rule hold.
        entries.sort_by_key(|e| e.generated);

        let mut by_original: Vec<u32> = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.original.is_some() {
                by_original.push(i as u32);
            }
        }
        by_original.sort_by_key(|&i| original_key(&entries[i as usize]));

        Self {
            file,
            source_root,
            sources,
            sources_content,
            names,
            entries,
            by_original,
        }
    }

    /// The generated file name, if the map records one.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The raw `sourceRoot`, if any. Flattened indexed maps have none; their
    /// sources are pre-resolved per section.
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    /// The `sources` array in its serialized form (duplicates preserved).
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// The `names` array.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The source at `index`, resolved against the map's `sourceRoot`.
    pub fn resolved_source(&self, index: usize) -> Option<String> {
        self.sources
            .get(index)
            .map(|s| path::resolve_source(self.source_root.as_deref(), s))
    }

    /// All decoded entries in generated order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a generated position back to an original location.
    ///
    /// Returns `None` when the table is empty or no entry satisfies `bias`
    /// on the relevant side; this is a normal outcome, not an error. A
    /// matched generated-only entry yields a location with all fields
    /// absent.
    pub fn original_position_for(&self, generated: Position, bias: Bias) -> Option<OriginalLocation> {
        let entry = self.find_generated(generated, bias)?;
        Some(self.resolve_entry(entry))
    }

    /// Map an original `source`/position to the nearest generated position.
    ///
    /// `source` is matched in resolved form, so both `"two.js"` and
    /// `"/the/root/two.js"` find the same entries when the root is
    /// `"/the/root"`.
    pub fn generated_position_for(
        &self,
        source: &str,
        original: Position,
        bias: Bias,
    ) -> Option<Position> {
        let source_idx = self.find_source_index(source)?;
        let key = (source_idx, original.line, original.column);

        let upper = self
            .by_original
            .partition_point(|&i| original_key(&self.entries[i as usize]) <= key);

        let idx = if upper > 0 && original_key(&self.entries[self.by_original[upper - 1] as usize]) == key
        {
            upper - 1
        } else {
            match bias {
                Bias::GreatestLowerBound => upper.checked_sub(1)?,
                Bias::LeastUpperBound => upper,
            }
        };

        let entry = &self.entries[*self.by_original.get(idx)? as usize];
        // The nearest neighbor must still belong to the queried source.
        let original_side = entry.original?;
        (original_side.source == source_idx).then_some(entry.generated)
    }

    /// Every generated position mapping to `line` of `source`, optionally
    /// narrowed to an exact original column.
    pub fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
    ) -> Vec<Position> {
        let Some(source_idx) = self.find_source_index(source) else {
            return Vec::new();
        };
        let key = (source_idx, line, column.unwrap_or(0));

        let mut i = self
            .by_original
            .partition_point(|&ix| original_key(&self.entries[ix as usize]) < key);

        let mut out = Vec::new();
        while let Some(&ix) = self.by_original.get(i) {
            let entry = &self.entries[ix as usize];
            let Some(original) = entry.original else {
                break;
            };
            if original.source != source_idx || original.line != line {
                break;
            }
            if let Some(column) = column {
                if original.column != column {
                    break;
                }
            }
            out.push(entry.generated);
            i += 1;
        }
        out
    }

    /// The inlined content for `source`, if `sourcesContent` carried it.
    pub fn source_content_for(&self, source: &str) -> Option<&str> {
        let idx = self.find_source_index(source)? as usize;
        self.sources_content.as_ref()?.get(idx)?.as_deref()
    }

    /// True when every source has inlined content available.
    pub fn has_contents_of_all_sources(&self) -> bool {
        match &self.sources_content {
            None => false,
            Some(contents) => {
                contents.len() >= self.sources.len() && contents.iter().all(|c| c.is_some())
            }
        }
    }

    /// Binary-search the generated view with the bias policy.
    fn find_generated(&self, generated: Position, bias: Bias) -> Option<&MappingEntry> {
        let upper = self.entries.partition_point(|e| e.generated <= generated);

        // Exact match: the last entry of the run wins, under either bias.
        if upper > 0 && self.entries[upper - 1].generated == generated {
            return Some(&self.entries[upper - 1]);
        }

        match bias {
            Bias::GreatestLowerBound => upper.checked_sub(1).map(|i| &self.entries[i]),
            Bias::LeastUpperBound => self.entries.get(upper),
        }
    }

    /// Find the index in `sources` whose resolved form matches `source`
    /// (itself resolved first, so relative callers behave identically).
    fn find_source_index(&self, source: &str) -> Option<u32> {
        let root = self.source_root.as_deref();
        let wanted = path::resolve_source(root, source);
        self.sources
            .iter()
            .position(|s| path::resolve_source(root, s) == wanted)
            .map(|i| i as u32)
    }

    /// Turn a matched entry into its resolved output form.
    fn resolve_entry(&self, entry: &MappingEntry) -> OriginalLocation {
        match entry.original {
            None => OriginalLocation::default(),
            Some(original) => OriginalLocation {
                source: self.resolved_source(original.source as usize),
                line: Some(original.line),
                column: Some(original.column),
                name: original
                    .name
                    .and_then(|n| self.names.get(n as usize).cloned()),
            },
        }
    }
}

fn original_key(entry: &MappingEntry) -> (u32, u32, u32) {
    match entry.original {
        Some(o) => (o.source, o.line, o.column),
        // Unreachable for indices in `by_original`; keep a total function.
        None => (u32::MAX, u32::MAX, u32::MAX),
    }
}
