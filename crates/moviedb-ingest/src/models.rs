//! Movie catalog entities and their record contracts
//!
//! Attribute records (`Genre`, `Company`, ...) deserialize from both the
//! Kaggle literal columns and TMDB JSON. Names are trimmed on the way in.
//! Association records (`MovieGenre`, ...) link a movie to an attribute by
//! natural key only; surrogate ids are resolved at finalize time.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::engine::{Record, SqlValue};

// ============================================================================
// Normalization helpers
// ============================================================================

/// Trimmed text, or `None` when blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `YYYY-MM-DD`; blank or unparsable dates are unknown
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Zero means "not reported" in both sources
pub fn reported(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

pub fn reported_f64(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

/// Gender 0 is "not specified"
pub fn known_gender(gender: Option<i64>) -> Option<i64> {
    gender.filter(|g| *g != 0)
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

fn trimmed_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(non_blank(Option::<String>::deserialize(deserializer)?.as_deref()))
}

fn gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(known_gender(Option::<i64>::deserialize(deserializer)?))
}

// ============================================================================
// Movies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Movie {
    pub id: i64,
    pub title: Option<String>,
    pub adult: bool,
    pub budget: Option<i64>,
    pub imdb_id: Option<String>,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub popularity: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub revenue: Option<i64>,
    pub runtime: Option<i64>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genres: Option<Vec<Genre>>,
    pub production_companies: Option<Vec<Company>>,
    pub production_countries: Option<Vec<Country>>,
    pub spoken_languages: Option<Vec<Language>>,
}

impl Record for Movie {
    fn export_order() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "adult",
            "budget",
            "imdb_id",
            "original_language",
            "original_title",
            "overview",
            "popularity",
            "release_date",
            "revenue",
            "runtime",
            "status",
            "tagline",
            "vote_average",
            "vote_count",
        ]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[
            ("adult", "is_adult"),
            ("budget", "budget_usd"),
            ("revenue", "revenue_usd"),
            ("runtime", "runtime_minutes"),
            ("vote_average", "vote_avg"),
            ("vote_count", "vote_cnt"),
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.title.as_deref().into(),
            self.adult.into(),
            self.budget.into(),
            self.imdb_id.as_deref().into(),
            self.original_language.as_deref().into(),
            self.original_title.as_deref().into(),
            self.overview.as_deref().into(),
            self.popularity.into(),
            self.release_date.into(),
            self.revenue.into(),
            self.runtime.into(),
            self.status.as_deref().into(),
            self.tagline.as_deref().into(),
            self.vote_average.into(),
            self.vote_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: i64,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
}

impl Record for Genre {
    fn export_order() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("name", "genre")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.name.as_str().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Company {
    pub id: i64,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
}

impl Record for Company {
    fn export_order() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("name", "production_company")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.name.as_str().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
    #[serde(deserialize_with = "trimmed")]
    pub iso_3166_1: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub name: String,
}

impl Record for Country {
    fn export_order() -> &'static [&'static str] {
        &["iso_3166_1", "name"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("name", "country_name")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.iso_3166_1.as_str().into(),
            non_blank(Some(self.name.as_str())).into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
    #[serde(deserialize_with = "trimmed")]
    pub iso_639_1: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub name: String,
}

impl Record for Language {
    fn export_order() -> &'static [&'static str] {
        &["iso_639_1", "name"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("name", "language")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.iso_639_1.as_str().into(),
            non_blank(Some(self.name.as_str())).into(),
        ]
    }
}

// ============================================================================
// Movie associations (natural keys only)
// ============================================================================

macro_rules! association {
    ($(#[$doc:meta])* $name:ident, $field:ident, [$($rename:expr),*]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub movie_id: i64,
            pub $field: String,
        }

        impl $name {
            pub fn new(movie_id: i64, $field: &str) -> Self {
                Self {
                    movie_id,
                    $field: $field.trim().to_string(),
                }
            }
        }

        impl Record for $name {
            fn export_order() -> &'static [&'static str] {
                &["movie_id", stringify!($field)]
            }

            fn override_target_names() -> &'static [(&'static str, &'static str)] {
                &[$((stringify!($field), $rename)),*]
            }

            fn values(&self) -> Vec<SqlValue> {
                vec![self.movie_id.into(), self.$field.as_str().into()]
            }
        }
    };
}

association!(
    /// Movie to genre, by genre name
    MovieGenre, genre, []
);
association!(
    /// Movie to production company, by company name
    MovieCompany, company, ["production_company"]
);
association!(
    /// Movie to production country, by ISO 3166-1 code
    MovieCountry, iso_3166_1, []
);
association!(
    /// Movie to spoken language, by ISO 639-1 code
    MovieLanguage, iso_639_1, []
);
association!(
    /// Movie to keyword, by keyword text
    MovieKeyword, keyword, []
);

// ============================================================================
// Credits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub id: i64,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "gender")]
    pub gender: Option<i64>,
    #[serde(default)]
    pub cast_id: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
    /// Not part of the source payload; set by the extractor
    #[serde(default)]
    pub movie_id: i64,
}

impl Record for CastMember {
    fn export_order() -> &'static [&'static str] {
        &["id", "name", "character", "gender", "cast_id", "movie_id", "order"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[
            ("id", "id_in_cast"),
            ("character", "character_name"),
            ("gender", "gender_id"),
            ("order", "cast_order"),
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            non_blank(Some(self.name.as_str())).into(),
            self.character.as_deref().into(),
            self.gender.into(),
            self.cast_id.into(),
            self.movie_id.into(),
            self.order.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub job: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "gender")]
    pub gender: Option<i64>,
    #[serde(default)]
    pub movie_id: i64,
}

impl Record for CrewMember {
    fn export_order() -> &'static [&'static str] {
        &["id", "name", "job", "department", "gender", "movie_id"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("id", "id_in_crew"), ("gender", "gender_id")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            non_blank(Some(self.name.as_str())).into(),
            self.job.as_deref().into(),
            self.department.as_deref().into(),
            self.gender.into(),
            self.movie_id.into(),
        ]
    }
}

/// Cast and crew of one movie
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Credits {
    pub movie_id: i64,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Attach credits to `movie_id`, stamping every member with it
    pub fn new(movie_id: i64, mut cast: Vec<CastMember>, mut crew: Vec<CrewMember>) -> Self {
        cast.iter_mut().for_each(|member| member.movie_id = movie_id);
        crew.iter_mut().for_each(|member| member.movie_id = movie_id);
        Self {
            movie_id,
            cast,
            crew,
        }
    }
}

// ============================================================================
// Keywords
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Keyword {
    pub id: i64,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
}

impl Record for Keyword {
    fn export_order() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[("name", "keyword")]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.name.as_str().into()]
    }
}

/// Keywords of one movie
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keywords {
    pub movie_id: i64,
    pub keywords: Vec<Keyword>,
}
