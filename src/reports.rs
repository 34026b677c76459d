//! Summary tables behind each report view.
//!
//! Each builder is a pure function of the dataset and the report config;
//! rendering is left to the caller.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{
    self, CategoryCount, CrossTab, GroupCount, column, grouped_count, grouped_count_rows, percent,
    top_n_field, top_n_long, value_counts,
};
use crate::cache::Dataset;
use crate::catalog::Catalog;
use crate::catalog::models::{Audience, ContentType, Field, LoadReport};
use crate::catalog::normalize::MONTHS;
use crate::config::ReportConfig;
use crate::describe::{self, DurationStats, Summary};

/// Headline numbers for the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub movies: usize,
    pub movie_share: f64,
    pub tv_shows: usize,
    pub tv_share: f64,
    /// Most frequent country text, co-productions counted as their own value.
    pub top_market: Option<String>,
}

pub fn kpis(catalog: &Catalog) -> Kpis {
    let total = catalog.len();
    let movies = catalog.of_type(ContentType::Movie).count();
    let tv_shows = catalog.of_type(ContentType::TvShow).count();
    let top_market = value_counts(column(catalog, Field::Country))
        .into_iter()
        .next()
        .map(|(label, _)| label);
    Kpis {
        total,
        movies,
        movie_share: percent(movies, total),
        tv_shows,
        tv_share: percent(tv_shows, total),
        top_market,
    }
}

/// Cardinality and most common value of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub feature: &'static str,
    pub unique: usize,
    pub most_common: Option<String>,
    pub frequency: usize,
}

pub fn categorical_summary(catalog: &Catalog, fields: &[Field]) -> Vec<CategorySummary> {
    fields
        .iter()
        .map(|&field| {
            let counts = value_counts(column(catalog, field));
            let (most_common, frequency) = match counts.first() {
                Some((label, n)) => (Some(label.clone()), *n),
                None => (None, 0),
            };
            CategorySummary {
                feature: field.name(),
                unique: counts.len(),
                most_common,
                frequency,
            }
        })
        .collect()
}

/// Dataset overview: KPIs, release-year spread, categorical summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub kpis: Kpis,
    pub release_year: Option<Summary>,
    pub categorical: Vec<CategorySummary>,
    pub load: LoadReport,
}

pub fn overview(catalog: &Catalog) -> Overview {
    Overview {
        kpis: kpis(catalog),
        release_year: describe::describe(catalog.iter().map(|t| t.release_year.map(f64::from))),
        categorical: categorical_summary(catalog, &[Field::Type, Field::Rating, Field::Country]),
        load: catalog.report.clone(),
    }
}

/// Movies vs TV shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub types: Vec<CategoryCount>,
    pub avg_movie_minutes: Option<f64>,
    pub avg_series_seasons: Option<f64>,
}

pub fn type_breakdown(catalog: &Catalog) -> TypeBreakdown {
    TypeBreakdown {
        types: top_n_field(catalog, Field::Type, usize::MAX, false),
        avg_movie_minutes: describe::mean_of(catalog.iter().map(|t| t.movie_minutes)),
        avg_series_seasons: describe::mean_of(catalog.iter().map(|t| t.series_seasons)),
    }
}

/// Production countries and their type mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryReport {
    pub top: Vec<CategoryCount>,
    /// (country, type, titles) for the leading countries.
    pub by_type: Vec<GroupCount>,
}

pub fn country_report(ds: &Dataset, cfg: &ReportConfig) -> CountryReport {
    let top = top_n_long(&ds.unnested.countries, cfg.top_countries, true);
    let mut by_type = Vec::new();
    for country in top.iter().take(cfg.country_breakdown) {
        // Substring on the raw text so co-productions count for each partner
        let types = value_counts(
            ds.catalog
                .iter()
                .filter(|t| t.country.contains(country.label.as_str()))
                .map(|t| Some(t.content_type.label())),
        );
        by_type.extend(types.into_iter().map(|(label, count)| GroupCount {
            key1: country.label.clone(),
            key2: label,
            count,
        }));
    }
    CountryReport { top, by_type }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakYear {
    pub year: i32,
    pub titles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: &'static str,
    pub titles: usize,
}

/// When titles were added to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// (year added, type, titles)
    pub by_year: Vec<GroupCount>,
    pub peak: Option<PeakYear>,
    /// Calendar order; months with no additions are omitted.
    pub by_month: Vec<MonthCount>,
}

pub fn timeline(catalog: &Catalog) -> Timeline {
    let by_year = grouped_count(catalog, Field::YearAdded, Field::Type);
    Timeline {
        peak: peak_year(&by_year),
        by_month: month_distribution(catalog),
        by_year,
    }
}

/// Year with the most additions across types. Ties go to the earlier year.
pub fn peak_year(by_year: &[GroupCount]) -> Option<PeakYear> {
    let mut totals: BTreeMap<i32, usize> = BTreeMap::new();
    for g in by_year {
        if let Ok(year) = g.key1.parse::<i32>() {
            *totals.entry(year).or_default() += g.count;
        }
    }
    let mut peak: Option<PeakYear> = None;
    for (year, titles) in totals {
        if peak.as_ref().is_none_or(|p| titles > p.titles) {
            peak = Some(PeakYear { year, titles });
        }
    }
    peak
}

pub fn month_distribution(catalog: &Catalog) -> Vec<MonthCount> {
    let counts: BTreeMap<String, usize> = value_counts(column(catalog, Field::MonthAdded))
        .into_iter()
        .collect();
    MONTHS
        .iter()
        .filter_map(|&month| counts.get(month).map(|&titles| MonthCount { month, titles }))
        .collect()
}

/// Genres ranked by how many titles list them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreReport {
    pub top: Vec<CategoryCount>,
    pub total_entries: usize,
    pub distinct: usize,
}

pub fn genre_report(ds: &Dataset, cfg: &ReportConfig) -> GenreReport {
    let genres = &ds.unnested.genres;
    GenreReport {
        top: top_n_long(genres, cfg.top_genres, false),
        total_entries: genres.len(),
        distinct: value_counts(genres.values()).len(),
    }
}

/// Duration statistics per type, each in its own unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    pub movies: Option<DurationStats>,
    pub tv_shows: Option<DurationStats>,
}

pub fn duration_report(catalog: &Catalog) -> DurationReport {
    DurationReport {
        movies: describe::duration_stats(catalog.of_type(ContentType::Movie).map(|t| t.movie_minutes)),
        tv_shows: describe::duration_stats(
            catalog.of_type(ContentType::TvShow).map(|t| t.series_seasons),
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentShare {
    pub since: i32,
    pub titles: usize,
    pub total: usize,
    pub percent: f64,
}

/// Release-year patterns relative to the newest release.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseReport {
    pub latest: i32,
    pub window_start: i32,
    /// (release year, type, titles) within the window.
    pub by_year: Vec<GroupCount>,
    pub recent: RecentShare,
}

/// `None` when no title has a release year.
pub fn release_report(catalog: &Catalog, cfg: &ReportConfig) -> Option<ReleaseReport> {
    let latest = catalog.iter().filter_map(|t| t.release_year).max()?;
    let window_start = latest - cfg.release_window_years;
    let by_year = grouped_count_rows(
        catalog.iter().filter(|t| t.release_year.is_some_and(|y| y >= window_start)),
        Field::ReleaseYear,
        Field::Type,
    );

    let since = latest - cfg.recent_window_years;
    let titles = catalog
        .iter()
        .filter(|t| t.release_year.is_some_and(|y| y >= since))
        .count();
    let total = catalog.len();

    Some(ReleaseReport {
        latest,
        window_start,
        by_year,
        recent: RecentShare {
            since,
            titles,
            total,
            percent: percent(titles, total),
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceStats {
    pub audience: Audience,
    pub titles: usize,
    pub avg_release_year: Option<f64>,
}

/// Ratings and the audience segments they map to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceReport {
    pub distribution: Vec<CategoryCount>,
    pub ratings: Vec<CategoryCount>,
    /// (audience, type, titles)
    pub by_type: Vec<GroupCount>,
    /// Largest segment first.
    pub stats: Vec<AudienceStats>,
}

pub fn audience_report(catalog: &Catalog, cfg: &ReportConfig) -> AudienceReport {
    let mut stats: Vec<AudienceStats> = Audience::ALL
        .iter()
        .filter_map(|&audience| {
            let members: Vec<_> = catalog.iter().filter(|t| t.audience == Some(audience)).collect();
            if members.is_empty() {
                return None;
            }
            Some(AudienceStats {
                audience,
                titles: members.len(),
                avg_release_year: describe::mean_of(
                    members.iter().map(|t| t.release_year.map(f64::from)),
                ),
            })
        })
        .collect();
    stats.sort_by(|a, b| b.titles.cmp(&a.titles));

    AudienceReport {
        distribution: top_n_field(catalog, Field::Audience, usize::MAX, false),
        ratings: top_n_field(catalog, Field::Rating, cfg.top_ratings, false),
        by_type: grouped_count(catalog, Field::Audience, Field::Type),
        stats,
    }
}

/// Genre × country opportunity heatmap.
pub fn heatmap(ds: &Dataset, cfg: &ReportConfig) -> CrossTab {
    aggregate::cross_tab(
        &ds.unnested.genres,
        &ds.unnested.countries,
        cfg.heatmap_genres,
        cfg.heatmap_countries,
    )
}

/// Choices offered by the strategy simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatorOptions {
    pub genres: Vec<String>,
    pub types: Vec<ContentType>,
    pub audiences: Vec<Audience>,
}

pub fn simulator_options(ds: &Dataset) -> SimulatorOptions {
    let mut genres: Vec<String> = value_counts(ds.unnested.genres.values())
        .into_iter()
        .map(|(label, _)| label)
        .collect();
    genres.sort();

    let mut audiences: Vec<Audience> = ds.catalog.iter().filter_map(|t| t.audience).collect();
    audiences.sort();
    audiences.dedup();

    SimulatorOptions {
        genres,
        types: vec![ContentType::Movie, ContentType::TvShow],
        audiences,
    }
}
