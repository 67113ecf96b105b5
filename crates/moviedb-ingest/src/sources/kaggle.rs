// Kaggle "The Movies Dataset" file extractors
//
// movies_metadata.csv, credits.csv and keywords.csv are read lazily, one row
// at a time. Rows that do not convert are skipped and counted; the count is
// reported once when the file is exhausted.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use super::pyliteral;
use crate::error::{IngestError, Result};
use crate::models::{non_blank, parse_date, reported, reported_f64, Credits, Keywords, Movie};

pub const MOVIES_FILE: &str = "movies_metadata.csv";
pub const CREDITS_FILE: &str = "credits.csv";
pub const KEYWORDS_FILE: &str = "keywords.csv";

// ============================================================================
// Row iterator
// ============================================================================

enum RowError {
    /// Reading the file failed; the stream cannot continue
    Fatal(IngestError),
    /// This row is unusable; move on
    Skip(String),
}

/// Converted rows of one CSV file
pub struct Rows<T> {
    rows: Box<dyn Iterator<Item = std::result::Result<T, RowError>> + Send>,
    file: String,
    skipped: usize,
    finished: bool,
}

impl<T> Rows<T> {
    fn open<R>(path: &Path, convert: fn(R) -> Result<T>) -> Result<Self>
    where
        R: DeserializeOwned + Send + 'static,
        T: 'static,
    {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let rows = reader.into_deserialize::<R>().map(move |row| match row {
            Ok(row) => convert(row).map_err(|e| RowError::Skip(e.to_string())),
            Err(e) if e.is_io_error() => Err(RowError::Fatal(e.into())),
            Err(e) => Err(RowError::Skip(e.to_string())),
        });

        Ok(Self {
            rows: Box::new(rows),
            file: path.display().to_string(),
            skipped: 0,
            finished: false,
        })
    }

    /// Rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.skipped > 0 {
            warn!(file = %self.file, skipped = self.skipped, "Done with skipped rows");
        }
    }
}

impl<T> Iterator for Rows<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.rows.next() {
                Some(Ok(item)) => return Some(Ok(item)),
                Some(Err(RowError::Skip(reason))) => {
                    self.skipped += 1;
                    debug!(file = %self.file, reason = %reason, "Skipping row");
                },
                Some(Err(RowError::Fatal(e))) => {
                    self.finish();
                    return Some(Err(e));
                },
                None => {
                    self.finish();
                    return None;
                },
            }
        }
    }
}

// ============================================================================
// Field parsing
// ============================================================================

fn parse_id(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IngestError::Extraction(format!("id is not a number: '{}'", raw)));
    }
    raw.parse()
        .map_err(|_| IngestError::Extraction(format!("id out of range: '{}'", raw)))
}

/// Whole number; `"90.0"` is accepted, blank is `None`
fn parse_whole(raw: &str, field: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Some(value));
    }
    match raw.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(Some(value as i64))
        },
        _ => Err(IngestError::Extraction(format!("{}: invalid number '{}'", field, raw))),
    }
}

fn parse_float(raw: &str, field: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| IngestError::Extraction(format!("{}: invalid number '{}'", field, raw)))
}

/// Decode a literal collection column; blank is `None`
fn literal<T: DeserializeOwned>(raw: &str) -> Result<Option<Vec<T>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(pyliteral::parse(raw)?)?))
}

// ============================================================================
// movies_metadata.csv
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MovieRow {
    id: String,
    adult: String,
    budget: String,
    genres: String,
    imdb_id: String,
    original_language: String,
    original_title: String,
    overview: String,
    popularity: String,
    production_companies: String,
    production_countries: String,
    release_date: String,
    revenue: String,
    runtime: String,
    spoken_languages: String,
    status: String,
    tagline: String,
    title: String,
    vote_average: String,
    vote_count: String,
}

fn movie_row(row: MovieRow) -> Result<Movie> {
    Ok(Movie {
        id: parse_id(&row.id)?,
        title: non_blank(Some(row.title.as_str())),
        adult: row.adult.trim().eq_ignore_ascii_case("true"),
        budget: reported(parse_whole(&row.budget, "budget")?),
        imdb_id: non_blank(Some(row.imdb_id.as_str())),
        original_language: non_blank(Some(row.original_language.as_str())),
        original_title: non_blank(Some(row.original_title.as_str())),
        overview: non_blank(Some(row.overview.as_str())),
        popularity: reported_f64(parse_float(&row.popularity, "popularity")?),
        release_date: parse_date(Some(row.release_date.as_str())),
        revenue: reported(parse_whole(&row.revenue, "revenue")?),
        runtime: reported(parse_whole(&row.runtime, "runtime")?),
        status: non_blank(Some(row.status.as_str())),
        tagline: non_blank(Some(row.tagline.as_str())),
        vote_average: reported_f64(parse_float(&row.vote_average, "vote_average")?),
        vote_count: reported(parse_whole(&row.vote_count, "vote_count")?),
        genres: literal(&row.genres)?,
        production_companies: literal(&row.production_companies)?,
        production_countries: literal(&row.production_countries)?,
        spoken_languages: literal(&row.spoken_languages)?,
    })
}

/// Movies of `movies_metadata.csv`
pub fn movies(path: impl AsRef<Path>) -> Result<Rows<Movie>> {
    Rows::open(path.as_ref(), movie_row)
}

// ============================================================================
// credits.csv
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreditsRow {
    cast: String,
    crew: String,
    id: String,
}

fn credits_row(row: CreditsRow) -> Result<Credits> {
    let movie_id = parse_id(&row.id)?;
    let cast = literal(&row.cast)?.unwrap_or_default();
    let crew = literal(&row.crew)?.unwrap_or_default();
    Ok(Credits::new(movie_id, cast, crew))
}

/// Cast and crew of `credits.csv`
pub fn credits(path: impl AsRef<Path>) -> Result<Rows<Credits>> {
    Rows::open(path.as_ref(), credits_row)
}

// ============================================================================
// keywords.csv
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeywordsRow {
    id: String,
    keywords: String,
}

fn keywords_row(row: KeywordsRow) -> Result<Keywords> {
    Ok(Keywords {
        movie_id: parse_id(&row.id)?,
        keywords: literal(&row.keywords)?.unwrap_or_default(),
    })
}

/// Keywords of `keywords.csv`
pub fn keywords(path: impl AsRef<Path>) -> Result<Rows<Keywords>> {
    Rows::open(path.as_ref(), keywords_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole() {
        assert_eq!(parse_whole("90.0", "runtime").unwrap(), Some(90));
        assert_eq!(parse_whole(" 81 ", "runtime").unwrap(), Some(81));
        assert_eq!(parse_whole("", "runtime").unwrap(), None);
        assert!(parse_whole("90.5", "runtime").is_err());
        assert!(parse_whole("1e30", "budget").is_err());
        assert!(parse_whole("-1e19", "revenue").is_err());
        assert!(parse_whole("inf", "budget").is_err());
        assert_eq!(parse_whole("3e7", "budget").unwrap(), Some(30_000_000));
        assert!(parse_whole("/ff9qCepilowshEtG2GYWwzt2bs4.jpg", "budget").is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("862").unwrap(), 862);
        assert!(parse_id("1997-08-20").is_err());
        assert!(parse_id("").is_err());
        assert!(parse_id("-1").is_err());
    }

    #[test]
    fn test_movie_row_conversion() {
        let row = MovieRow {
            id: "862".to_string(),
            adult: "False".to_string(),
            budget: "30000000".to_string(),
            genres: "[{'id': 16, 'name': 'Animation'}]".to_string(),
            popularity: "21.946943".to_string(),
            release_date: "1995-10-30".to_string(),
            revenue: "0".to_string(),
            runtime: "81.0".to_string(),
            status: "Released".to_string(),
            title: "Toy Story".to_string(),
            vote_average: "7.7".to_string(),
            vote_count: "5415".to_string(),
            ..MovieRow::default()
        };

        let movie = movie_row(row).unwrap();
        assert_eq!(movie.id, 862);
        assert!(!movie.adult);
        assert_eq!(movie.budget, Some(30_000_000));
        assert_eq!(movie.revenue, None);
        assert_eq!(movie.runtime, Some(81));
        assert_eq!(movie.tagline, None);
        assert_eq!(movie.genres.unwrap()[0].name, "Animation");
        // blank literal column means "unknown", not "empty"
        assert_eq!(movie.spoken_languages, None);
    }

    #[test]
    fn test_bad_literal_is_an_error() {
        let row = KeywordsRow {
            id: "1".to_string(),
            keywords: "[{'id': 1, 'name': ".to_string(),
        };
        assert!(matches!(keywords_row(row), Err(IngestError::Literal { .. })));
    }
}
