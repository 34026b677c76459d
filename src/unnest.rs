use serde::Serialize;

use crate::catalog::Catalog;
use crate::catalog::models::Title;
use crate::SENTINEL;

/// Separator between values in a multi-valued column.
pub const SEPARATOR: &str = ", ";

/// The comma-separated columns that get expanded into long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MultiField {
    Cast,
    Director,
    Country,
    Genre,
}

impl MultiField {
    pub const ALL: [MultiField; 4] = [Self::Cast, Self::Director, Self::Country, Self::Genre];

    /// Name of the single value a long-table entry holds.
    pub fn value_name(&self) -> &'static str {
        match self {
            Self::Cast => "actor",
            Self::Director => "director",
            Self::Country => "country",
            Self::Genre => "genre",
        }
    }

    fn source<'a>(&self, title: &'a Title) -> &'a str {
        match self {
            Self::Cast => &title.cast,
            Self::Director => &title.director,
            Self::Country => &title.country,
            Self::Genre => &title.listed_in,
        }
    }
}

/// One (catalog row, atomic value) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Index of the originating row in `Catalog::titles`.
    pub index: usize,
    pub value: String,
}

/// Long-form expansion of one multi-valued column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongTable {
    pub field: MultiField,
    pub entries: Vec<Entry>,
}

impl LongTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column view for the aggregation helpers.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.iter().map(|e| Some(e.value.as_str()))
    }

    /// Entries that trace back to catalog row `index`, in split order.
    pub fn for_index(&self, index: usize) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.index == index)
    }
}

/// Expand one multi-valued column into (original index, value) pairs.
/// No deduplication: every fragment becomes its own entry. An empty field
/// yields a single sentinel entry.
pub fn unnest(catalog: &Catalog, field: MultiField) -> LongTable {
    let mut entries = Vec::with_capacity(catalog.len());
    for (index, title) in catalog.iter().enumerate() {
        let text = field.source(title);
        if text.trim().is_empty() {
            entries.push(Entry { index, value: SENTINEL.to_string() });
            continue;
        }
        for fragment in text.split(SEPARATOR) {
            entries.push(Entry { index, value: fragment.to_string() });
        }
    }
    log::debug!(
        "Unnested {}: {} entries from {} titles",
        field.value_name(),
        entries.len(),
        catalog.len()
    );
    LongTable { field, entries }
}

/// The four long tables built from one catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unnested {
    pub cast: LongTable,
    pub directors: LongTable,
    pub countries: LongTable,
    pub genres: LongTable,
}

impl Unnested {
    pub fn get(&self, field: MultiField) -> &LongTable {
        match field {
            MultiField::Cast => &self.cast,
            MultiField::Director => &self.directors,
            MultiField::Country => &self.countries,
            MultiField::Genre => &self.genres,
        }
    }
}

/// Run the unnester once per multi-valued column.
pub fn unnest_all(catalog: &Catalog) -> Unnested {
    log::debug!("Preprocessing: unnesting multi-value columns");
    Unnested {
        cast: unnest(catalog, MultiField::Cast),
        directors: unnest(catalog, MultiField::Director),
        countries: unnest(catalog, MultiField::Country),
        genres: unnest(catalog, MultiField::Genre),
    }
}
