// Movies group

use async_trait::async_trait;
use moviedb_common::schema::{
    staging_table, COUNTRIES_TABLE, GENRES_TABLE, LANGUAGES_TABLE, MOVIES_TABLE,
    MOVIE_GENRES_TABLE, MOVIE_PRODUCTION_COMPANIES_TABLE, MOVIE_PRODUCTION_COUNTRIES_TABLE,
    MOVIE_SPOKEN_LANGUAGES_TABLE, PRODUCTION_COMPANIES_TABLE, STATUSES_TABLE, STATUS_COLUMN,
    TITLES_TABLE, TITLE_COLUMN,
};

use super::{sql, with_keys};
use crate::config::IngestConfig;
use crate::engine::{BatchWriter, EntityGroup, Store, ValueWriter};
use crate::error::Result;
use crate::models::{
    Company, Country, Genre, Language, Movie, MovieCompany, MovieCountry, MovieGenre,
    MovieLanguage,
};

pub struct MoviesGroup {
    movies: BatchWriter<Movie>,
    titles: ValueWriter,
    statuses: ValueWriter,
    genres: BatchWriter<Genre, i64>,
    languages: BatchWriter<Language, String>,
    countries: BatchWriter<Country, String>,
    companies: BatchWriter<Company, i64>,
    movie_genres: BatchWriter<MovieGenre>,
    movie_languages: BatchWriter<MovieLanguage>,
    movie_countries: BatchWriter<MovieCountry>,
    movie_companies: BatchWriter<MovieCompany>,
    movie_ids: Vec<i64>,
}

impl MoviesGroup {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let batch = config.batch_size;
        let caches = &config.caches;

        Ok(Self {
            movies: BatchWriter::new(staging_table(MOVIES_TABLE), batch)?,
            titles: ValueWriter::new(TITLES_TABLE, TITLE_COLUMN, batch, caches.values)?,
            statuses: ValueWriter::new(STATUSES_TABLE, STATUS_COLUMN, batch, caches.values)?,
            genres: BatchWriter::with_cache(GENRES_TABLE, batch, caches.genres, |g: &Genre| g.id)?,
            languages: BatchWriter::with_cache(
                LANGUAGES_TABLE,
                batch,
                caches.languages,
                |l: &Language| l.iso_639_1.clone(),
            )?,
            countries: BatchWriter::with_cache(
                COUNTRIES_TABLE,
                batch,
                caches.countries,
                |c: &Country| c.iso_3166_1.clone(),
            )?,
            companies: BatchWriter::with_cache(
                PRODUCTION_COMPANIES_TABLE,
                batch,
                caches.companies,
                |c: &Company| c.id,
            )?,
            movie_genres: BatchWriter::new(staging_table(MOVIE_GENRES_TABLE), batch)?,
            movie_languages: BatchWriter::new(staging_table(MOVIE_SPOKEN_LANGUAGES_TABLE), batch)?,
            movie_countries: BatchWriter::new(
                staging_table(MOVIE_PRODUCTION_COUNTRIES_TABLE),
                batch,
            )?,
            movie_companies: BatchWriter::new(
                staging_table(MOVIE_PRODUCTION_COMPANIES_TABLE),
                batch,
            )?,
            movie_ids: Vec::new(),
        })
    }

    /// Ids of every movie staged so far, in stream order
    pub fn movie_ids(&self) -> &[i64] {
        &self.movie_ids
    }

    pub fn into_movie_ids(self) -> Vec<i64> {
        self.movie_ids
    }
}

#[async_trait]
impl EntityGroup for MoviesGroup {
    type Entity = Movie;

    fn name(&self) -> &'static str {
        "movies"
    }

    fn staging_ddl(&self) -> &'static [&'static str] {
        sql::MOVIES_STAGING_DDL
    }

    async fn stage<S: Store>(&mut self, mut movie: Movie, store: &mut S) -> Result<()> {
        let id = movie.id;
        let genres = with_keys(movie.genres.take(), |g: &Genre| g.name.as_str());
        let languages = with_keys(movie.spoken_languages.take(), |l: &Language| l.iso_639_1.as_str());
        let countries = with_keys(movie.production_countries.take(), |c: &Country| c.iso_3166_1.as_str());
        let companies = with_keys(movie.production_companies.take(), |c: &Company| c.name.as_str());

        self.titles
            .extend([movie.title.as_deref(), movie.original_title.as_deref()], store)
            .await?;
        self.statuses.append(movie.status.as_deref(), store).await?;
        self.movies.append(movie, store).await?;
        self.movie_ids.push(id);

        let links = genres
            .as_ref()
            .map(|items| items.iter().map(|g| MovieGenre::new(id, &g.name)).collect::<Vec<_>>());
        self.genres.extend(genres, store).await?;
        self.movie_genres.extend(links, store).await?;

        let links = languages.as_ref().map(|items| {
            items
                .iter()
                .map(|l| MovieLanguage::new(id, &l.iso_639_1))
                .collect::<Vec<_>>()
        });
        self.languages.extend(languages, store).await?;
        self.movie_languages.extend(links, store).await?;

        let links = countries.as_ref().map(|items| {
            items
                .iter()
                .map(|c| MovieCountry::new(id, &c.iso_3166_1))
                .collect::<Vec<_>>()
        });
        self.countries.extend(countries, store).await?;
        self.movie_countries.extend(links, store).await?;

        let links = companies
            .as_ref()
            .map(|items| items.iter().map(|c| MovieCompany::new(id, &c.name)).collect::<Vec<_>>());
        self.companies.extend(companies, store).await?;
        self.movie_companies.extend(links, store).await?;

        Ok(())
    }

    async fn flush_all<S: Store>(&mut self, store: &mut S) -> Result<()> {
        self.titles.flush(store).await?;
        self.statuses.flush(store).await?;
        self.genres.flush(store).await?;
        self.languages.flush(store).await?;
        self.countries.flush(store).await?;
        self.companies.flush(store).await?;
        self.movies.flush(store).await?;
        self.movie_genres.flush(store).await?;
        self.movie_languages.flush(store).await?;
        self.movie_countries.flush(store).await?;
        self.movie_companies.flush(store).await?;
        Ok(())
    }

    fn finalize_statements(&self) -> &'static [&'static str] {
        sql::MOVIES_FINALIZE
    }
}
