//! Content strategy simulator: how crowded is a (genre, type, audience) niche?

use serde::Serialize;

use crate::aggregate::value_counts;
use crate::catalog::Catalog;
use crate::catalog::models::{Audience, ContentType, Title};
use crate::SENTINEL;

/// Matched-count below which a niche is considered open.
pub const LOW_SATURATION_BELOW: usize = 50;
/// Matched-count from which a niche is considered crowded.
pub const HIGH_SATURATION_FROM: usize = 200;

/// Market saturation tier of a niche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Saturation {
    Low,
    Moderate,
    High,
}

impl Saturation {
    pub fn from_count(count: usize) -> Self {
        if count < LOW_SATURATION_BELOW {
            Self::Low
        } else if count < HIGH_SATURATION_FROM {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Market status shown to the user.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Low => "Blue Ocean",
            Self::Moderate => "Competitive",
            Self::High => "Saturated",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "high opportunity",
            Self::Moderate => "moderate competition",
            Self::High => "high competition",
        }
    }
}

/// Every title whose genre list contains `genre` (case-sensitive substring)
/// and whose type and audience bucket match exactly.
pub fn simulate<'a>(
    catalog: &'a Catalog,
    genre: &str,
    content_type: ContentType,
    audience: Audience,
) -> Vec<&'a Title> {
    catalog
        .iter()
        .filter(|t| {
            t.listed_in.contains(genre)
                && t.content_type == content_type
                && t.audience == Some(audience)
        })
        .collect()
}

/// A title shown as an example of the niche.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NicheExample {
    pub title: String,
    pub release_year: Option<i32>,
    pub country: String,
    pub rating: Option<String>,
}

/// Market analysis of one simulated niche.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub genre: String,
    pub content_type: ContentType,
    pub audience: Audience,
    pub matched: usize,
    pub saturation: Saturation,
    /// Average duration in the type's unit (minutes or seasons).
    pub avg_duration: Option<f64>,
    /// Most frequent country text among the matches.
    pub dominant_market: String,
    /// Most recent releases first.
    pub examples: Vec<NicheExample>,
}

impl MarketReport {
    pub fn is_gap(&self) -> bool {
        self.matched == 0
    }
}

/// Run the simulator and summarize its matches.
pub fn market_report(
    catalog: &Catalog,
    genre: &str,
    content_type: ContentType,
    audience: Audience,
    example_count: usize,
) -> MarketReport {
    log::info!(
        "Strategy simulator: genre={genre}, type={content_type}, audience={audience}"
    );
    let matches = simulate(catalog, genre, content_type, audience);

    let durations: Vec<f64> = matches.iter().filter_map(|t| t.duration_value()).collect();
    let avg_duration = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    let dominant_market = value_counts(matches.iter().map(|t| Some(t.country.as_str())))
        .into_iter()
        .next()
        .map(|(label, _)| label)
        .unwrap_or_else(|| SENTINEL.to_string());

    let mut recent = matches.clone();
    // Stable: equal years keep catalog order; unknown years sort last
    recent.sort_by(|a, b| b.release_year.cmp(&a.release_year));
    let examples = recent
        .into_iter()
        .take(example_count)
        .map(|t| NicheExample {
            title: t.title.clone(),
            release_year: t.release_year,
            country: t.country.clone(),
            rating: t.rating.clone(),
        })
        .collect();

    MarketReport {
        genre: genre.to_string(),
        content_type,
        audience,
        matched: matches.len(),
        saturation: Saturation::from_count(matches.len()),
        avg_duration,
        dominant_market,
        examples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog_from_rows, sample_catalog};

    #[test]
    fn test_saturation_tiers() {
        assert_eq!(Saturation::from_count(0), Saturation::Low);
        assert_eq!(Saturation::from_count(49), Saturation::Low);
        assert_eq!(Saturation::from_count(50), Saturation::Moderate);
        assert_eq!(Saturation::from_count(199), Saturation::Moderate);
        assert_eq!(Saturation::from_count(200), Saturation::High);
        assert_eq!(Saturation::Low.status(), "Blue Ocean");
    }

    #[test]
    fn test_simulate_matches_all_three_criteria() {
        let cat = sample_catalog();
        let hits = simulate(&cat, "International TV Shows", ContentType::TvShow, Audience::Adults);
        let ids: Vec<&str> = hits.iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s3"]);

        // Same genre, wrong type
        assert!(simulate(&cat, "International TV Shows", ContentType::Movie, Audience::Adults).is_empty());
    }

    #[test]
    fn test_substring_and_case_sensitivity() {
        let cat = catalog_from_rows(&[
            r#"s1,Movie,A,,,,,2020,R,90 min,"Romantic Comedies, Dramas",x"#,
            r#"s2,Movie,B,,,,,2020,R,90 min,Comedies,x"#,
        ]);
        assert_eq!(simulate(&cat, "Comedies", ContentType::Movie, Audience::Adults).len(), 2);
        assert!(simulate(&cat, "comedies", ContentType::Movie, Audience::Adults).is_empty());
    }

    #[test]
    fn test_gap_is_blue_ocean() {
        let cat = sample_catalog();
        let report = market_report(&cat, "Anime", ContentType::TvShow, Audience::Teens, 5);
        assert!(report.is_gap());
        assert_eq!(report.saturation.status(), "Blue Ocean");
        assert_eq!(report.avg_duration, None);
        assert_eq!(report.dominant_market, "Unknown");
        assert!(report.examples.is_empty());
    }

    #[test]
    fn test_market_report() {
        let cat = catalog_from_rows(&[
            r#"s1,Movie,Old,,,India,,1999,TV-14,100 min,Dramas,x"#,
            r#"s2,Movie,New,,,India,,2021,TV-14,120 min,Dramas,x"#,
            r#"s3,Movie,Mid,,,Japan,,2010,PG-13,,Dramas,x"#,
            r#"s4,TV Show,Show,,,India,,2021,TV-14,2 Seasons,TV Dramas,x"#,
        ]);
        let report = market_report(&cat, "Dramas", ContentType::Movie, Audience::Teens, 2);
        assert_eq!(report.matched, 3);
        assert_eq!(report.saturation, Saturation::Low);
        // Missing duration is left out of the average
        assert_eq!(report.avg_duration, Some(110.0));
        assert_eq!(report.dominant_market, "India");
        let titles: Vec<&str> = report.examples.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid"]);
    }
}
