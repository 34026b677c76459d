use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Movie or TV show, as spelled in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TV Show",
        }
    }

    /// Unit of the type-specific duration column.
    pub fn duration_unit(&self) -> &'static str {
        match self {
            Self::Movie => "min",
            Self::TvShow => "seasons",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Movie" => Ok(Self::Movie),
            "TV Show" => Ok(Self::TvShow),
            other => Err(format!("unknown content type \"{other}\"")),
        }
    }
}

/// Coarse age-appropriateness bucket derived from a rating code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Audience {
    #[serde(rename = "Adults")]
    Adults,
    #[serde(rename = "Kids")]
    Kids,
    #[serde(rename = "Older Kids")]
    OlderKids,
    #[serde(rename = "Teens")]
    Teens,
}

impl Audience {
    pub const ALL: [Audience; 4] = [Self::Adults, Self::Kids, Self::OlderKids, Self::Teens];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Adults => "Adults",
            Self::Kids => "Kids",
            Self::OlderKids => "Older Kids",
            Self::Teens => "Teens",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Audience {
    type Err = String;

    /// Accepts the display label as well as the compact spelling
    /// (`"Older Kids"` / `"OlderKids"` / `"older-kids"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "adults" => Ok(Self::Adults),
            "kids" => Ok(Self::Kids),
            "olderkids" => Ok(Self::OlderKids),
            "teens" => Ok(Self::Teens),
            _ => Err(format!("unknown audience \"{s}\"")),
        }
    }
}

/// One row of the source file as it appears on disk.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(default)]
    pub show_id: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub listed_in: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A normalized catalog row: one per title, with derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub show_id: String,
    pub content_type: ContentType,
    pub title: String,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: String,
    pub description: String,

    // Derived at load time
    pub year_added: Option<i32>,
    pub month_added: Option<&'static str>,
    pub movie_minutes: Option<f64>,
    pub series_seasons: Option<f64>,
    pub audience: Option<Audience>,
}

impl Title {
    /// Duration in the unit that matches this title's type.
    pub fn duration_value(&self) -> Option<f64> {
        match self.content_type {
            ContentType::Movie => self.movie_minutes,
            ContentType::TvShow => self.series_seasons,
        }
    }

    /// Read a single-valued column as text. Null cells come back as `None`.
    pub fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Type => Some(Cow::Borrowed(self.content_type.label())),
            Field::Title => Some(Cow::Borrowed(&self.title)),
            Field::Director => Some(Cow::Borrowed(&self.director)),
            Field::Cast => Some(Cow::Borrowed(&self.cast)),
            Field::Country => Some(Cow::Borrowed(&self.country)),
            Field::Rating => self.rating.as_deref().map(Cow::Borrowed),
            Field::Audience => self.audience.map(|a| Cow::Borrowed(a.label())),
            Field::Genres => Some(Cow::Borrowed(&self.listed_in)),
            Field::ReleaseYear => self.release_year.map(|y| Cow::Owned(y.to_string())),
            Field::YearAdded => self.year_added.map(|y| Cow::Owned(y.to_string())),
            Field::MonthAdded => self.month_added.map(Cow::Borrowed),
        }
    }
}

/// Catalog columns that can be counted or grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    Title,
    Director,
    Cast,
    Country,
    Rating,
    Audience,
    Genres,
    ReleaseYear,
    YearAdded,
    MonthAdded,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Title => "title",
            Self::Director => "director",
            Self::Cast => "cast",
            Self::Country => "country",
            Self::Rating => "rating",
            Self::Audience => "audience",
            Self::Genres => "listed_in",
            Self::ReleaseYear => "release_year",
            Self::YearAdded => "year_added",
            Self::MonthAdded => "month_added",
        }
    }
}

/// What happened while normalizing the source file.
/// Every counter is a per-field recovery; none of them fail the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub unparsed_dates: usize,
    pub malformed_durations: usize,
    pub unbucketed_ratings: usize,
    pub missing_release_years: usize,
}
