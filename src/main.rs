use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use streamscope::aggregate::{CategoryCount, CrossTab, GroupCount};
use streamscope::cache::DatasetCache;
use streamscope::catalog::models::{Audience, ContentType};
use streamscope::reports;
use streamscope::simulator;

#[derive(Parser)]
#[command(name = "streamscope", version, about = "Streaming catalog analyzer")]
struct Cli {
    /// Path to the catalog CSV
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum TypeArg {
    Movie,
    #[value(alias = "tv-show")]
    Tv,
}

impl From<TypeArg> for ContentType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Movie => ContentType::Movie,
            TypeArg::Tv => ContentType::TvShow,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// KPIs, release-year summary and load diagnostics
    Overview,

    /// Movies vs TV shows
    Types,

    /// Top production countries and their type mix
    Countries,

    /// Titles added per year and per month
    Timeline,

    /// Most common genres
    Genres,

    /// Duration statistics per type
    Durations,

    /// Release-year trends
    Releases,

    /// Ratings and audience segments
    Audience,

    /// Genre × country heatmap
    Heatmap,

    /// Analyze a (genre, type, audience) niche
    Simulate {
        /// Genre to match (case-sensitive substring of the genre list)
        #[arg(short, long)]
        genre: String,

        /// Content type
        #[arg(short = 't', long = "type", value_enum, default_value = "movie")]
        content_type: TypeArg,

        /// Audience bucket (Kids, Older Kids, Teens, Adults)
        #[arg(short, long, default_value = "Adults")]
        audience: Audience,

        /// Number of example titles (defaults to config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Genres and audiences the simulator accepts
    Options,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = streamscope::config::AppConfig::load();
    let cfg = &config.report;

    // Resolve data path: CLI > config > ./netflix.csv
    let data_path = config.resolve_data_path(cli.data);
    log::info!("Data file: {}", data_path.display());

    let cache = DatasetCache::new();
    let ds = cache
        .get(&data_path)
        .with_context(|| format!("Failed to load {}", data_path.display()))?;
    let catalog = &ds.catalog;

    if catalog.is_empty() {
        log::warn!("{} contains no titles", data_path.display());
    }

    match cli.command {
        Commands::Overview => {
            let o = reports::overview(catalog);
            if cli.json {
                return print_json(&o);
            }
            let k = &o.kpis;
            println!("Catalog Overview");
            println!("================");
            println!("Total titles:     {}", k.total);
            println!("Movies:           {} ({:.1}%)", k.movies, k.movie_share);
            println!("TV shows:         {} ({:.1}%)", k.tv_shows, k.tv_share);
            println!(
                "Top market:       {}",
                k.top_market.as_deref().unwrap_or(streamscope::SENTINEL)
            );
            println!();

            if let Some(s) = &o.release_year {
                println!("Release year");
                println!(
                    "  {:>6} {:>8} {:>7} {:>6} {:>7} {:>7} {:>7} {:>6}",
                    "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
                );
                println!(
                    "  {:>6} {:>8.1} {:>7.2} {:>6.0} {:>7.1} {:>7.1} {:>7.1} {:>6.0}",
                    s.count, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max
                );
                println!();
            }

            println!("{:<10} {:>7}  {:<30} {:>6}", "Feature", "Unique", "Most common", "Freq");
            println!("{}", "-".repeat(57));
            for c in &o.categorical {
                println!(
                    "{:<10} {:>7}  {:<30} {:>6}",
                    c.feature,
                    c.unique,
                    truncate(c.most_common.as_deref().unwrap_or("-"), 30),
                    c.frequency
                );
            }
            println!();

            let l = &o.load;
            println!(
                "Loaded {} rows: {} dates unparsed, {} durations malformed, {} ratings unbucketed, {} release years missing",
                l.total_rows,
                l.unparsed_dates,
                l.malformed_durations,
                l.unbucketed_ratings,
                l.missing_release_years
            );
        }

        Commands::Types => {
            let t = reports::type_breakdown(catalog);
            if cli.json {
                return print_json(&t);
            }
            println!("Content types:");
            println!();
            print_category_table("Type", &t.types);
            println!();
            if let Some(m) = t.avg_movie_minutes {
                println!("Average movie length:    {:.0} min", m);
            }
            if let Some(s) = t.avg_series_seasons {
                println!("Average series length:   {:.1} seasons", s);
            }
        }

        Commands::Countries => {
            let r = reports::country_report(&ds, cfg);
            if cli.json {
                return print_json(&r);
            }
            println!("Top {} production countries:", r.top.len());
            println!();
            print_category_table("Country", &r.top);
            println!();
            println!("Type mix in the top {} countries:", cfg.country_breakdown);
            println!();
            print_group_table("Country", "Type", &r.by_type);
        }

        Commands::Timeline => {
            let t = reports::timeline(catalog);
            if cli.json {
                return print_json(&t);
            }
            println!("Titles added per year:");
            println!();
            print_group_table("Year", "Type", &t.by_year);
            if let Some(p) = &t.peak {
                println!();
                println!("Peak year: {} ({} titles added)", p.year, p.titles);
            }
            println!();
            println!("Titles added per month:");
            for m in &t.by_month {
                println!("  {:<10} {:>6}", m.month, m.titles);
            }
        }

        Commands::Genres => {
            let g = reports::genre_report(&ds, cfg);
            if cli.json {
                return print_json(&g);
            }
            println!(
                "Top {} genres ({} distinct, {} genre tags):",
                g.top.len(),
                g.distinct,
                g.total_entries
            );
            println!();
            print_category_table("Genre", &g.top);
        }

        Commands::Durations => {
            let d = reports::duration_report(catalog);
            if cli.json {
                return print_json(&d);
            }
            println!(
                "{:<10} {:>6} {:>8} {:>7} {:>6} {:>6} {:>6}  {}",
                "Type", "Count", "Mean", "Median", "Mode", "Min", "Max", "Unit"
            );
            println!("{}", "-".repeat(64));
            for (content_type, stats) in [
                (ContentType::Movie, &d.movies),
                (ContentType::TvShow, &d.tv_shows),
            ] {
                match stats {
                    Some(s) => println!(
                        "{:<10} {:>6} {:>8.1} {:>7.1} {:>6.0} {:>6.0} {:>6.0}  {}",
                        content_type.label(),
                        s.count,
                        s.mean,
                        s.median,
                        s.mode,
                        s.min,
                        s.max,
                        content_type.duration_unit()
                    ),
                    None => println!("{:<10} {:>6}", content_type.label(), 0),
                }
            }
        }

        Commands::Releases => {
            let report = reports::release_report(catalog, cfg);
            if cli.json {
                return print_json(&report);
            }
            let Some(r) = report else {
                println!("No release years in the catalog.");
                return Ok(());
            };
            println!("Releases {}-{}:", r.window_start, r.latest);
            println!();
            print_group_table("Year", "Type", &r.by_year);
            println!();
            println!(
                "Released since {}: {} of {} titles ({:.1}%)",
                r.recent.since, r.recent.titles, r.recent.total, r.recent.percent
            );
        }

        Commands::Audience => {
            let a = reports::audience_report(catalog, cfg);
            if cli.json {
                return print_json(&a);
            }
            println!("Audience segments:");
            println!();
            print_category_table("Audience", &a.distribution);
            println!();
            println!("Top {} ratings:", a.ratings.len());
            println!();
            print_category_table("Rating", &a.ratings);
            println!();
            print_group_table("Audience", "Type", &a.by_type);
            println!();
            println!("{:<12} {:>7} {:>10}", "Audience", "Titles", "Avg year");
            println!("{}", "-".repeat(31));
            for s in &a.stats {
                let avg = s
                    .avg_release_year
                    .map(|y| format!("{:.1}", y))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<12} {:>7} {:>10}", s.audience.label(), s.titles, avg);
            }
        }

        Commands::Heatmap => {
            let h = reports::heatmap(&ds, cfg);
            if cli.json {
                return print_json(&h);
            }
            if h.is_empty() {
                println!("Not enough genre and country data for a heatmap.");
                return Ok(());
            }
            print_cross_tab(&h);
        }

        Commands::Simulate { genre, content_type, audience, limit } => {
            let report = simulator::market_report(
                catalog,
                &genre,
                content_type.into(),
                audience,
                limit.unwrap_or(cfg.examples),
            );
            if cli.json {
                return print_json(&report);
            }
            println!(
                "Niche: {} / {} / {}",
                report.genre, report.content_type, report.audience
            );
            println!();
            if report.is_gap() {
                println!("No existing titles: this niche is an untapped market gap.");
                println!(
                    "Market status: {} ({})",
                    report.saturation.status(),
                    report.saturation.description()
                );
                return Ok(());
            }
            println!("Competitors:      {}", report.matched);
            println!(
                "Market status:    {} ({})",
                report.saturation.status(),
                report.saturation.description()
            );
            if let Some(avg) = report.avg_duration {
                println!(
                    "Average duration: {:.1} {}",
                    avg,
                    report.content_type.duration_unit()
                );
            }
            println!("Dominant market:  {}", report.dominant_market);
            println!();

            println!("{:<35} {:>6} {:<8} {}", "Title", "Year", "Rating", "Country");
            println!("{}", "-".repeat(80));
            for e in &report.examples {
                let year = e
                    .release_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<35} {:>6} {:<8} {}",
                    truncate(&e.title, 35),
                    year,
                    e.rating.as_deref().unwrap_or("-"),
                    e.country
                );
            }
        }

        Commands::Options => {
            let o = reports::simulator_options(&ds);
            if cli.json {
                return print_json(&o);
            }
            println!("Types:");
            for t in &o.types {
                println!("  {}", t);
            }
            println!();
            println!("Audiences:");
            for a in &o.audiences {
                println!("  {}", a);
            }
            println!();
            println!("Genres ({}):", o.genres.len());
            for g in &o.genres {
                println!("  {}", g);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", text);
    Ok(())
}

/// Shorten to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Print ranked categories with counts and shares.
fn print_category_table(heading: &str, rows: &[CategoryCount]) {
    println!("{:<35} {:>7} {:>7}", heading, "Titles", "%");
    println!("{}", "-".repeat(51));
    for c in rows {
        println!(
            "{:<35} {:>7} {:>6.1}%",
            truncate(&c.label, 35),
            c.count,
            c.percent
        );
    }
}

/// Print sparse (key1, key2) counts.
fn print_group_table(first: &str, second: &str, rows: &[GroupCount]) {
    println!("{:<30} {:<12} {:>7}", first, second, "Titles");
    println!("{}", "-".repeat(51));
    for g in rows {
        println!("{:<30} {:<12} {:>7}", truncate(&g.key1, 30), g.key2, g.count);
    }
}

/// Print a cross-tab with abbreviated column headers.
fn print_cross_tab(tab: &CrossTab) {
    print!("{:<28}", "");
    for c in &tab.columns {
        print!(" {:>8}", truncate(c, 8));
    }
    println!();
    println!("{}", "-".repeat(28 + 9 * tab.columns.len()));

    for (label, counts) in tab.rows.iter().zip(&tab.counts) {
        print!("{:<28}", truncate(label, 28));
        for n in counts {
            print!(" {:>8}", n);
        }
        println!();
    }

    println!();
    println!(
        "Rows = {}, columns = {}",
        tab.row_field.value_name(),
        tab.column_field.value_name()
    );
}
