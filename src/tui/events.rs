use crate::gateway::ApiError;
use crate::models::{OwnedFilm, SearchPage, User};

/// Events flowing through the event loop: raw terminal input plus completions
/// of spawned backend requests.
#[derive(Debug)]
pub enum AppEvent {
    Input(crossterm::event::Event),
    /// `/api/auth/me` resolved for the current route.
    SessionResolved(Result<User, ApiError>),
    /// Library listing (plain or filtered) finished. `seq` fences out
    /// responses that were overtaken by a newer load.
    LibraryLoaded {
        seq: u64,
        result: Result<Vec<OwnedFilm>, ApiError>,
    },
    DetailLoaded(Result<OwnedFilm, ApiError>),
    FilmDeleted(Result<(), ApiError>),
    /// Catalog search finished, same fencing as the library.
    CatalogSearched {
        seq: u64,
        result: Result<SearchPage, ApiError>,
    },
    FilmAdded(Result<(), ApiError>),
    LoggedIn(Result<User, ApiError>),
    Registered(Result<User, ApiError>),
    LoggedOut(Result<(), ApiError>),
}

/// Active page. One route is live at a time, and entering Library or Search
/// re-resolves the session — nothing is cached across navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Library,
    Search,
}

impl Route {
    pub fn label(self) -> &'static str {
        match self {
            Route::Login => "Connexion",
            Route::Library => "Ma vidéothèque",
            Route::Search => "Recherche TMDB",
        }
    }
}
