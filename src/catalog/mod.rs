pub mod models;
pub mod normalize;

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use crate::SENTINEL;
use models::{ContentType, LoadReport, RawRecord, Title};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("File '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: {message}")]
    InvalidType { row: usize, message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// The normalized one-row-per-title table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub titles: Vec<Title>,
    pub report: LoadReport,
}

impl Catalog {
    /// Load and normalize the catalog at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading catalog from {}", path.display());
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::error!("File '{}' not found", path.display());
                return Err(CatalogError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let catalog = Self::from_reader(file)?;
        log::info!(
            "Catalog loaded: {} titles ({} dates unparsed, {} durations malformed, {} ratings unbucketed)",
            catalog.len(),
            catalog.report.unparsed_dates,
            catalog.report.malformed_durations,
            catalog.report.unbucketed_ratings,
        );
        Ok(catalog)
    }

    /// Normalize CSV text from any reader (in-memory counterpart of `load`).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut titles = Vec::new();
        let mut report = LoadReport::default();

        for (i, result) in rdr.deserialize::<RawRecord>().enumerate() {
            let raw = result?;
            // 1-based, header is row 1
            let title = normalize_record(raw, i + 2, &mut report)?;
            titles.push(title);
        }
        report.total_rows = titles.len();

        log::debug!("Preprocessing: {} rows normalized", report.total_rows);
        if report.unbucketed_ratings > 0 {
            log::debug!(
                "{} titles have a rating outside the audience table",
                report.unbucketed_ratings
            );
        }

        Ok(Self { titles, report })
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Title> {
        self.titles.iter()
    }

    /// Titles of one type.
    pub fn of_type(&self, content_type: ContentType) -> impl Iterator<Item = &Title> {
        self.titles.iter().filter(move |t| t.content_type == content_type)
    }
}

/// Turn one raw row into a catalog row, recording per-field recoveries.
fn normalize_record(raw: RawRecord, row: usize, report: &mut LoadReport) -> Result<Title> {
    let content_type: ContentType = raw
        .content_type
        .parse()
        .map_err(|message| CatalogError::InvalidType { row, message })?;

    let date_added = raw.date_added.as_deref().and_then(normalize::parse_date_added);
    if raw.date_added.is_some() && date_added.is_none() {
        log::trace!("Row {row}: unparseable date_added {:?}", raw.date_added);
        report.unparsed_dates += 1;
    }
    let (year_added, month_added) = normalize::year_and_month(date_added);

    let (movie_minutes, series_seasons) =
        normalize::split_duration(content_type, raw.duration.as_deref());
    if movie_minutes.is_none() && series_seasons.is_none() {
        log::trace!("Row {row}: malformed duration {:?}", raw.duration);
        report.malformed_durations += 1;
    }

    let audience = raw.rating.as_deref().and_then(normalize::audience_for_rating);
    if audience.is_none() {
        report.unbucketed_ratings += 1;
    }
    if raw.release_year.is_none() {
        report.missing_release_years += 1;
    }

    Ok(Title {
        show_id: raw.show_id.unwrap_or_default(),
        content_type,
        title: raw.title.unwrap_or_default(),
        director: fill_unknown(raw.director),
        cast: fill_unknown(raw.cast),
        country: fill_unknown(raw.country),
        date_added,
        release_year: raw.release_year,
        rating: raw.rating,
        duration: raw.duration,
        listed_in: raw.listed_in.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        year_added,
        month_added,
        movie_minutes,
        series_seasons,
        audience,
    })
}

fn fill_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| SENTINEL.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::models::Audience;

    pub(crate) const HEADER: &str =
        "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description";

    /// Build a catalog from CSV data rows (header is prepended).
    pub(crate) fn catalog_from_rows(rows: &[&str]) -> Catalog {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        Catalog::from_reader(text.as_bytes()).unwrap()
    }

    pub(crate) fn sample_catalog() -> Catalog {
        catalog_from_rows(&[
            r#"s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,"September 25, 2021",2020,PG-13,90 min,Documentaries,A documentary."#,
            r#"s2,TV Show,Blood & Water,,"Ama Qamata, Khosi Ngema",South Africa,"September 24, 2021",2021,TV-MA,2 Seasons,"International TV Shows, TV Dramas, TV Mysteries",A drama."#,
            r#"s3,TV Show,Ganglands,Julien Leclercq,"Sami Bouajila, Tracy Gotoas",,"September 24, 2021",2021,TV-MA,1 Season,"Crime TV Shows, International TV Shows, TV Action & Adventure",A thriller."#,
            r#"s4,Movie,Sankofa,Haile Gerima,"Kofi Ghanaba, Oyafunmike Ogunlano","United States, Ghana, Burkina Faso","September 24, 2021",1993,TV-MA,125 min,"Dramas, Independent Movies, International Movies",A period piece."#,
            r#"s5,Movie,My Little Pony,"Robert Cullen, José Luis Ucha","Vanessa Hudgens, Kimiko Glenn",,"September 24, 2021",2021,PG,91 min,Children & Family Movies,A cartoon."#,
            r#"s6,Movie,Louis C.K. 2017,Louis C.K.,Louis C.K.,United States,"April 4, 2017",2017,74 min,,Movies,A stand-up special."#,
        ])
    }

    #[test]
    fn test_fills_missing_with_sentinel() {
        let cat = sample_catalog();
        assert_eq!(cat.titles[0].cast, "Unknown");
        assert_eq!(cat.titles[1].director, "Unknown");
        assert_eq!(cat.titles[2].country, "Unknown");
        // Other columns are untouched
        assert_eq!(cat.titles[0].title, "Dick Johnson Is Dead");
    }

    #[test]
    fn test_dates_parse_into_year_and_month() {
        let cat = sample_catalog();
        assert_eq!(cat.titles[0].year_added, Some(2021));
        assert_eq!(cat.titles[0].month_added, Some("September"));
        assert_eq!(cat.titles[5].month_added, Some("April"));
    }

    #[test]
    fn test_unparseable_date_is_null_not_error() {
        let cat = catalog_from_rows(&[
            "s1,Movie,A,,,,someday,2020,R,90 min,Dramas,x",
            "s2,Movie,B,,,,,2020,R,90 min,Dramas,x",
        ]);
        assert_eq!(cat.titles[0].date_added, None);
        assert_eq!(cat.titles[0].year_added, None);
        assert_eq!(cat.titles[0].month_added, None);
        assert_eq!(cat.titles[1].year_added, None);
        // Only the present-but-unparseable value counts
        assert_eq!(cat.report.unparsed_dates, 1);
    }

    #[test]
    fn test_duration_exclusive_and_matches_type() {
        let cat = sample_catalog();
        for t in &cat.titles {
            assert!(!(t.movie_minutes.is_some() && t.series_seasons.is_some()));
            match t.content_type {
                ContentType::Movie => assert!(t.series_seasons.is_none()),
                ContentType::TvShow => assert!(t.movie_minutes.is_none()),
            }
        }
        assert_eq!(cat.titles[1].series_seasons, Some(2.0));
        assert_eq!(cat.titles[3].movie_minutes, Some(125.0));
    }

    #[test]
    fn test_three_seasons() {
        let cat = catalog_from_rows(&["s1,TV Show,A,,,,,2020,TV-14,3 Seasons,TV Dramas,x"]);
        assert_eq!(cat.titles[0].series_seasons, Some(3.0));
        assert_eq!(cat.titles[0].movie_minutes, None);
    }

    #[test]
    fn test_shifted_row_keeps_loading() {
        // Duration missing, rating holds the runtime
        let cat = sample_catalog();
        let t = &cat.titles[5];
        assert_eq!(t.rating.as_deref(), Some("74 min"));
        assert_eq!(t.movie_minutes, None);
        assert_eq!(t.audience, None);
        assert_eq!(cat.report.malformed_durations, 1);
    }

    #[test]
    fn test_audience_bucket() {
        let cat = sample_catalog();
        // TV-MA movie resolves to Adults
        assert_eq!(cat.titles[3].audience, Some(Audience::Adults));
        assert_eq!(cat.titles[0].audience, Some(Audience::Teens));
        assert_eq!(cat.titles[4].audience, Some(Audience::OlderKids));
        assert_eq!(cat.report.unbucketed_ratings, 1);
    }

    #[test]
    fn test_invalid_release_year_is_null() {
        let cat = catalog_from_rows(&["s1,Movie,A,,,,,unknown,R,90 min,Dramas,x"]);
        assert_eq!(cat.titles[0].release_year, None);
        assert_eq!(cat.report.missing_release_years, 1);
    }

    #[test]
    fn test_unknown_type_fails_load() {
        let text = format!("{HEADER}\ns1,Podcast,A,,,,,2020,R,90 min,Dramas,x");
        let err = Catalog::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidType { row: 2, .. }));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Catalog::load(Path::new("/nonexistent/netflix.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netflix.csv");
        std::fs::write(
            &path,
            format!("{HEADER}\ns1,Movie,A,,,,\"June 1, 2020\",2020,R,90 min,Dramas,x\n"),
        )
        .unwrap();
        let cat = Catalog::load(&path).unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.report.total_rows, 1);
        assert_eq!(cat.titles[0].month_added, Some("June"));
    }

    #[test]
    fn test_of_type() {
        let cat = sample_catalog();
        assert_eq!(cat.of_type(ContentType::Movie).count(), 4);
        assert_eq!(cat.of_type(ContentType::TvShow).count(), 2);
    }
}
