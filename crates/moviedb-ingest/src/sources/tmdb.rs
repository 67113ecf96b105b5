// TheMovieDB API extractors

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TmdbConfig;
use crate::error::{IngestError, Result};
use crate::models::{
    non_blank, parse_date, reported, reported_f64, CastMember, Company, Country, Credits,
    CrewMember, Genre, Keyword, Keywords, Language, Movie,
};

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Listed>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct Listed {
    id: i64,
}

/// `/movie/{id}` details
#[derive(Debug, Deserialize)]
struct Details {
    id: i64,
    #[serde(default)]
    adult: bool,
    budget: Option<i64>,
    imdb_id: Option<String>,
    original_language: Option<String>,
    original_title: Option<String>,
    overview: Option<String>,
    popularity: Option<f64>,
    release_date: Option<String>,
    revenue: Option<i64>,
    runtime: Option<i64>,
    status: Option<String>,
    tagline: Option<String>,
    title: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    production_companies: Vec<Company>,
    #[serde(default)]
    production_countries: Vec<Country>,
    #[serde(default)]
    spoken_languages: Vec<Language>,
}

impl From<Details> for Movie {
    fn from(d: Details) -> Self {
        Movie {
            id: d.id,
            title: non_blank(d.title.as_deref()),
            adult: d.adult,
            budget: reported(d.budget),
            imdb_id: non_blank(d.imdb_id.as_deref()),
            original_language: non_blank(d.original_language.as_deref()),
            original_title: non_blank(d.original_title.as_deref()),
            overview: non_blank(d.overview.as_deref()),
            popularity: reported_f64(d.popularity),
            release_date: parse_date(d.release_date.as_deref()),
            revenue: reported(d.revenue),
            runtime: reported(d.runtime),
            status: non_blank(d.status.as_deref()),
            tagline: non_blank(d.tagline.as_deref()),
            vote_average: reported_f64(d.vote_average),
            vote_count: reported(d.vote_count),
            genres: Some(d.genres),
            production_companies: Some(d.production_companies),
            production_countries: Some(d.production_countries),
            spoken_languages: Some(d.spoken_languages),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreditsPayload {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct KeywordsPayload {
    #[serde(default)]
    keywords: Vec<Keyword>,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the TMDB v3 API
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("moviedb-ingest/0.1")
            .build()?;

        Ok(Self { client, config })
    }

    /// Movies currently playing, page by page, with full details
    pub fn movies(&self) -> impl Stream<Item = Result<Movie>> + '_ {
        let last_page = |total: u32| match self.config.max_pages {
            Some(max) => total.min(max),
            None => total,
        };

        stream::try_unfold(Some(1u32), move |page| async move {
            let Some(page) = page else {
                return Ok::<_, IngestError>(None);
            };
            let listing: Page = self
                .get_json("movie/now_playing", &[("page", page.to_string())])
                .await?;
            let last = last_page(listing.total_pages);
            info!(page, last, results = listing.results.len(), "Fetched now-playing page");

            let next = (page < last).then_some(page + 1);
            let listed = stream::iter(listing.results.into_iter().map(Ok::<_, IngestError>));
            Ok(Some((listed, next)))
        })
        .try_flatten()
        .and_then(move |listed| async move {
            let details: Details = self.get_json(&format!("movie/{}", listed.id), &[]).await?;
            Ok(Movie::from(details))
        })
    }

    /// Cast and crew of each movie, in `ids` order
    pub fn credits<'a>(&'a self, ids: &'a [i64]) -> impl Stream<Item = Result<Credits>> + 'a {
        stream::iter(ids.iter().copied()).then(move |id| async move {
            let payload: CreditsPayload = self.get_json(&format!("movie/{}/credits", id), &[]).await?;
            Ok::<_, IngestError>(Credits::new(id, payload.cast, payload.crew))
        })
    }

    /// Keywords of each movie, in `ids` order
    pub fn keywords<'a>(&'a self, ids: &'a [i64]) -> impl Stream<Item = Result<Keywords>> + 'a {
        stream::iter(ids.iter().copied()).then(move |id| async move {
            let payload: KeywordsPayload =
                self.get_json(&format!("movie/{}/keywords", id), &[]).await?;
            Ok::<_, IngestError>(Keywords {
                movie_id: id,
                keywords: payload.keywords,
            })
        })
    }

    /// GET with retry and exponential backoff
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let attempts = self.config.max_retries.saturating_add(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch(path, query).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Request {} attempt {}/{} failed: {}", path, attempt, attempts, e);
                    last_error = Some(e);

                    if attempt < attempts {
                        let backoff = self
                            .config
                            .retry_backoff_ms
                            .saturating_mul(2u64.saturating_pow(attempt - 1));
                        debug!("Retrying {} in {} ms", path, backoff);
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                    }
                },
            }
        }

        Err(IngestError::Extraction(format!(
            "{} failed after {} attempts: {}",
            path,
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.config.api_token.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_token() {
        assert!(matches!(
            TmdbClient::new(TmdbConfig::default()),
            Err(IngestError::Config(_))
        ));
    }

    #[test]
    fn test_details_conversion() {
        let details: Details = serde_json::from_value(serde_json::json!({
            "id": 550,
            "adult": false,
            "budget": 63000000,
            "revenue": 0,
            "title": "Fight Club",
            "tagline": "",
            "release_date": "1999-10-15",
            "genres": [{"id": 18, "name": "Drama"}],
            "spoken_languages": [{"english_name": "English", "iso_639_1": "en", "name": "English"}],
            "production_countries": [],
            "production_companies": [{"id": 508, "logo_path": null, "name": "Regency Enterprises", "origin_country": "US"}]
        }))
        .unwrap();

        let movie = Movie::from(details);
        assert_eq!(movie.budget, Some(63_000_000));
        assert_eq!(movie.revenue, None);
        assert_eq!(movie.tagline, None);
        assert_eq!(movie.production_countries, Some(Vec::new()));
        assert_eq!(movie.spoken_languages.unwrap()[0].iso_639_1, "en");
    }
}
