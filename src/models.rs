use serde::{Deserialize, Serialize};

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Session user as returned by `/api/auth/me`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Person {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

/// A film already stored in the user's library. Backend-assigned identity;
/// never comparable with a [`CatalogResult`] id.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OwnedFilm {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub year: String,
    pub poster: Option<String>,
    pub rate: Option<f32>,
    pub opinion: Option<String>,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub support: String,
    pub director: Option<Person>,
    #[serde(default)]
    pub actors: Vec<Person>,
    #[serde(default)]
    pub description: String,
    pub release_date: Option<String>,
    pub library_id: Option<String>,
}

/// An external catalog hit, not yet owned. Carries the raw TMDB shape so the
/// add flow needs no second fetch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogResult {
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
}

/// Server pagination envelope for catalog searches. `page` is 1-indexed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchPage {
    pub results: Vec<CatalogResult>,
    pub page: i32,
    pub total_pages: i32,
}

impl SearchPage {
    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Body of `POST /api/films`. Built fresh per submission.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddFilmRequest {
    pub tmdb_id: i32,
    pub lang: String,
    pub support: String,
    pub rate: f32,
    pub opinion: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub lastname: String,
    pub firstname: String,
    pub email: String,
    pub password: String,
}

/// Minimal display projection shared by the two film kinds. The library view
/// and the search view render near-identical cards from it without ever
/// mixing the two identity spaces.
pub trait CardDisplay {
    fn title(&self) -> &str;
    /// Full CDN poster URL, or `None` when the path is missing (rendered as
    /// a placeholder).
    fn poster_url(&self) -> Option<String>;
    fn year_label(&self) -> String;
    fn rating_label(&self) -> Option<String>;
}

fn expand_poster(path: Option<&str>) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{POSTER_BASE}{p}")),
        _ => None,
    }
}

impl CardDisplay for OwnedFilm {
    fn title(&self) -> &str {
        &self.title
    }

    fn poster_url(&self) -> Option<String> {
        expand_poster(self.poster.as_deref())
    }

    fn year_label(&self) -> String {
        self.year.clone()
    }

    fn rating_label(&self) -> Option<String> {
        self.rate.map(|r| format!("{r}/10"))
    }
}

impl CardDisplay for CatalogResult {
    fn title(&self) -> &str {
        &self.title
    }

    fn poster_url(&self) -> Option<String> {
        expand_poster(self.poster_path.as_deref())
    }

    fn year_label(&self) -> String {
        self.release_date
            .as_deref()
            .filter(|d| d.len() >= 4)
            .map(|d| d[..4].to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    fn rating_label(&self) -> Option<String> {
        self.vote_average
            .filter(|v| *v > 0.0)
            .map(|v| format!("⭐ {v:.1}/10"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CatalogResult {
        CatalogResult {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: Some("/matrix.jpg".to_string()),
            release_date: Some("1999-03-30".to_string()),
            vote_average: Some(8.2),
        }
    }

    #[test]
    fn catalog_result_roundtrip_is_lossless() {
        let original = matrix();
        let serialized = serde_json::to_string(&original).unwrap();
        let parsed: CatalogResult = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.id, 603);
        assert_eq!(parsed.title, "The Matrix");
    }

    #[test]
    fn catalog_result_labels() {
        let film = matrix();
        assert_eq!(film.year_label(), "1999");
        assert_eq!(film.rating_label().unwrap(), "⭐ 8.2/10");
        assert_eq!(
            film.poster_url().unwrap(),
            "https://image.tmdb.org/t/p/w500/matrix.jpg"
        );
    }

    #[test]
    fn missing_release_date_renders_na() {
        let film = CatalogResult {
            release_date: None,
            ..matrix()
        };
        assert_eq!(film.year_label(), "N/A");
    }

    #[test]
    fn zero_vote_average_has_no_rating_label() {
        let film = CatalogResult {
            vote_average: Some(0.0),
            ..matrix()
        };
        assert!(film.rating_label().is_none());
    }

    #[test]
    fn empty_poster_path_falls_back() {
        let film = CatalogResult {
            poster_path: Some(String::new()),
            ..matrix()
        };
        assert!(film.poster_url().is_none());
    }

    #[test]
    fn owned_film_parses_camel_case() {
        let film: OwnedFilm = serde_json::from_value(serde_json::json!({
            "id": 12,
            "libraryId": "lib-1",
            "title": "Amélie",
            "year": "2001",
            "poster": "/amelie.jpg",
            "lang": "fr",
            "support": "DVD",
            "rate": 9.5,
            "opinion": "Un classique.",
            "description": "Montmartre.",
            "releaseDate": "2001-04-25",
            "director": {"firstname": "Jean-Pierre", "lastname": "Jeunet"},
            "actors": [{"firstname": "Audrey", "lastname": "Tautou"}]
        }))
        .unwrap();
        assert_eq!(film.id, 12);
        assert_eq!(film.rating_label().unwrap(), "9.5/10");
        assert_eq!(film.director.unwrap().full_name(), "Jean-Pierre Jeunet");
        assert_eq!(film.library_id.as_deref(), Some("lib-1"));
    }

    #[test]
    fn add_request_serializes_tmdb_id_camel_case() {
        let body = serde_json::to_value(AddFilmRequest {
            tmdb_id: 603,
            lang: "fr".to_string(),
            support: "Blu-ray".to_string(),
            rate: 8.5,
            opinion: String::new(),
        })
        .unwrap();
        assert_eq!(body["tmdbId"], 603);
        assert!(body.get("tmdb_id").is_none());
    }

    #[test]
    fn pagination_bounds() {
        let mut page = SearchPage {
            results: vec![matrix()],
            page: 1,
            total_pages: 5,
        };
        assert!(page.has_pagination());
        assert!(!page.can_go_prev());
        assert!(page.can_go_next());

        page.page = 5;
        assert!(page.can_go_prev());
        assert!(!page.can_go_next());

        page.total_pages = 1;
        page.page = 1;
        assert!(!page.has_pagination());
    }
}
