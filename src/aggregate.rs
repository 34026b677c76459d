//! Stateless aggregations over the catalog and its long tables.
//!
//! Every function here is deterministic given its inputs and never
//! mutates them.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::catalog::models::{Field, Title};
use crate::unnest::{LongTable, MultiField};
use crate::SENTINEL;

/// A ranked category with its share of the column's non-null total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Count for one (key1, key2) combination. Zero combinations are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key1: String,
    pub key2: String,
    pub count: usize,
}

/// Dense count matrix between two long tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_field: MultiField,
    pub column_field: MultiField,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[r][c]` pairs `rows[r]` with `columns[c]`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Count for a (row, column) label pair; absent labels count as zero.
    pub fn get(&self, row: &str, column: &str) -> usize {
        let r = self.rows.iter().position(|l| l == row);
        let c = self.columns.iter().position(|l| l == column);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }
}

/// Share of `part` in `total` as a percentage (0 when `total` is 0).
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// A single catalog column as a sequence of nullable text cells.
pub fn column(catalog: &Catalog, field: Field) -> impl Iterator<Item = Option<Cow<'_, str>>> {
    catalog.iter().map(move |t| t.field(field))
}

/// Occurrences of each distinct non-null value, most frequent first.
/// Ties keep the order in which values were first encountered.
pub fn value_counts<I, S>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values.into_iter().flatten() {
        let value = value.as_ref();
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Top `n` values of a column with their percentage of the non-null total.
///
/// With `exclude_sentinel`, `"Unknown"` is dropped from the ranking but
/// still counts toward the denominator, so the percentages then sum to
/// less than 100.
pub fn top_n<I, S>(values: I, n: usize, exclude_sentinel: bool) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let counts = value_counts(values);
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    counts
        .into_iter()
        .filter(|(label, _)| !(exclude_sentinel && label == SENTINEL))
        .take(n)
        .map(|(label, count)| CategoryCount {
            percent: percent(count, total),
            label,
            count,
        })
        .collect()
}

/// `top_n` over a catalog column.
pub fn top_n_field(catalog: &Catalog, field: Field, n: usize, exclude_sentinel: bool) -> Vec<CategoryCount> {
    top_n(column(catalog, field), n, exclude_sentinel)
}

/// `top_n` over a long table.
pub fn top_n_long(table: &LongTable, n: usize, exclude_sentinel: bool) -> Vec<CategoryCount> {
    top_n(table.values(), n, exclude_sentinel)
}

/// Rows per (a, b) combination, ordered by key. Rows with a null key are skipped.
pub fn grouped_count(catalog: &Catalog, a: Field, b: Field) -> Vec<GroupCount> {
    grouped_count_rows(catalog.iter(), a, b)
}

/// `grouped_count` over any subset of catalog rows.
pub fn grouped_count_rows<'a, I>(rows: I, a: Field, b: Field) -> Vec<GroupCount>
where
    I: IntoIterator<Item = &'a Title>,
{
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for title in rows {
        if let (Some(k1), Some(k2)) = (title.field(a), title.field(b)) {
            *groups.entry((k1.into_owned(), k2.into_owned())).or_default() += 1;
        }
    }
    groups
        .into_iter()
        .map(|((key1, key2), count)| GroupCount { key1, key2, count })
        .collect()
}

/// Cross-tabulate two long tables joined on original index.
///
/// Each axis is first restricted to its `top_*` most frequent values
/// (ranked with the sentinel included), then the sentinel is dropped.
/// Labels are sorted; every cell of the matrix is filled.
pub fn cross_tab(rows: &LongTable, columns: &LongTable, top_rows: usize, top_columns: usize) -> CrossTab {
    let keep_rows = top_labels(rows, top_rows);
    let keep_columns = top_labels(columns, top_columns);

    let mut column_values: HashMap<usize, Vec<&str>> = HashMap::new();
    for e in &columns.entries {
        if keep_columns.contains(e.value.as_str()) {
            column_values.entry(e.index).or_default().push(&e.value);
        }
    }

    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for e in &rows.entries {
        if !keep_rows.contains(e.value.as_str()) {
            continue;
        }
        if let Some(values) = column_values.get(&e.index) {
            for &c in values {
                *pairs.entry((e.value.as_str(), c)).or_default() += 1;
            }
        }
    }

    let row_labels: Vec<String> = pairs
        .keys()
        .map(|(r, _)| *r)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let column_labels: Vec<String> = pairs
        .keys()
        .map(|(_, c)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = vec![vec![0usize; column_labels.len()]; row_labels.len()];
    for ((r, c), n) in &pairs {
        // Labels came from `pairs`, so both lookups succeed
        if let (Ok(ri), Ok(ci)) = (
            row_labels.binary_search_by(|l| l.as_str().cmp(*r)),
            column_labels.binary_search_by(|l| l.as_str().cmp(*c)),
        ) {
            counts[ri][ci] = *n;
        }
    }

    CrossTab {
        row_field: rows.field,
        column_field: columns.field,
        rows: row_labels,
        columns: column_labels,
        counts,
    }
}

fn top_labels(table: &LongTable, k: usize) -> HashSet<String> {
    top_n_long(table, k, false)
        .into_iter()
        .map(|c| c.label)
        .filter(|l| l != SENTINEL)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog_from_rows, sample_catalog};
    use crate::unnest::{unnest, unnest_all};

    #[test]
    fn test_value_counts_ties_first_seen() {
        let values = [Some("b"), Some("a"), None, Some("a"), Some("b"), Some("c")];
        let counts = value_counts(values);
        assert_eq!(
            counts,
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_n_percentages() {
        let values = [Some("x"), Some("x"), Some("y"), Some("Unknown"), None];
        let all = top_n(values, 10, false);
        assert_eq!(all[0].label, "x");
        assert!((all[0].percent - 50.0).abs() < 1e-9);
        let sum: f64 = all.iter().map(|c| c.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let known = top_n(values, 10, true);
        assert_eq!(known.len(), 2);
        let sum: f64 = known.iter().map(|c| c.percent).sum();
        assert!((sum - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_is_non_increasing_and_truncated() {
        let cat = sample_catalog();
        let genres = unnest(&cat, MultiField::Genre);
        let top = top_n_long(&genres, 3, false);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].label, "International TV Shows");
        assert_eq!(top[0].count, 2);
        for pair in top.windows(2) {
            assert!(pair[0].percent >= pair[1].percent);
        }
    }

    #[test]
    fn test_top_n_field() {
        let cat = sample_catalog();
        let top = top_n_field(&cat, Field::Type, 5, false);
        assert_eq!(top[0].label, "Movie");
        assert_eq!(top[0].count, 4);
        assert_eq!(top[1].label, "TV Show");
    }

    #[test]
    fn test_grouped_count_sparse() {
        let cat = sample_catalog();
        let groups = grouped_count(&cat, Field::Type, Field::Audience);
        assert_eq!(
            groups,
            vec![
                GroupCount { key1: "Movie".into(), key2: "Adults".into(), count: 1 },
                GroupCount { key1: "Movie".into(), key2: "Older Kids".into(), count: 1 },
                GroupCount { key1: "Movie".into(), key2: "Teens".into(), count: 1 },
                GroupCount { key1: "TV Show".into(), key2: "Adults".into(), count: 2 },
            ]
        );
        // The Movie row with no audience bucket is skipped
        let total: usize = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_grouped_count_by_year() {
        let cat = sample_catalog();
        let groups = grouped_count(&cat, Field::YearAdded, Field::Type);
        assert_eq!(groups[0], GroupCount { key1: "2017".into(), key2: "Movie".into(), count: 1 });
        assert_eq!(groups[1], GroupCount { key1: "2021".into(), key2: "Movie".into(), count: 3 });
        assert_eq!(groups[2], GroupCount { key1: "2021".into(), key2: "TV Show".into(), count: 2 });
    }

    #[test]
    fn test_cross_tab() {
        let cat = catalog_from_rows(&[
            r#"s1,Movie,A,,,"India, United States",,2020,R,90 min,"Dramas, Comedies",x"#,
            r#"s2,Movie,B,,,India,,2020,R,90 min,Dramas,x"#,
            r#"s3,Movie,C,,,,,2020,R,90 min,Dramas,x"#,
            r#"s4,Movie,D,,,Japan,,2020,R,90 min,Anime Features,x"#,
        ]);
        let u = unnest_all(&cat);
        let heat = cross_tab(&u.genres, &u.countries, 10, 10);
        assert_eq!(heat.rows, vec!["Anime Features", "Comedies", "Dramas"]);
        assert_eq!(heat.columns, vec!["India", "Japan", "United States"]);
        assert_eq!(heat.get("Dramas", "India"), 2);
        assert_eq!(heat.get("Dramas", "United States"), 1);
        assert_eq!(heat.get("Comedies", "Japan"), 0);
        assert_eq!(heat.get("Dramas", "Unknown"), 0);
        assert_eq!(heat.counts.len(), 3);
        assert!(heat.counts.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_cross_tab_top_k_restricts_axes() {
        let cat = catalog_from_rows(&[
            r#"s1,Movie,A,,,India,,2020,R,90 min,Dramas,x"#,
            r#"s2,Movie,B,,,India,,2020,R,90 min,Dramas,x"#,
            r#"s3,Movie,C,,,Japan,,2020,R,90 min,Comedies,x"#,
        ]);
        let u = unnest_all(&cat);
        let heat = cross_tab(&u.genres, &u.countries, 1, 1);
        assert_eq!(heat.rows, vec!["Dramas"]);
        assert_eq!(heat.columns, vec!["India"]);
        assert_eq!(heat.counts, vec![vec![2]]);
    }

    #[test]
    fn test_percent_of_empty_total() {
        assert_eq!(percent(3, 0), 0.0);
        assert!(top_n(Vec::<Option<&str>>::new(), 5, false).is_empty());
    }
}
