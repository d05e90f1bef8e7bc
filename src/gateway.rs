use crate::models::{AddFilmRequest, OwnedFilm, RegisterRequest, SearchPage, User};
use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const API_PREFIX: &str = "/api";

/// Outcome classification for backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401 anywhere: the session cookie is gone or invalid. Handled
    /// once, centrally, by routing back to the login view. Callers never
    /// see their success branch run for this case.
    #[error("session lost (401)")]
    AuthLost,
    /// Any other non-2xx status, or a network-level failure (`status: None`).
    /// The response body is not parsed.
    #[error("request failed (status {status:?})")]
    RequestFailed { status: Option<u16> },
    /// A 2xx body that did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Typed surface of the film-catalog backend. Everything the views need goes
/// through this trait so tests can substitute a fake.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn list_films(&self) -> Result<Vec<OwnedFilm>, ApiError>;
    async fn search_library(&self, query: &str) -> Result<Vec<OwnedFilm>, ApiError>;
    async fn film_detail(&self, id: i32) -> Result<OwnedFilm, ApiError>;
    async fn delete_film(&self, id: i32) -> Result<(), ApiError>;
    async fn search_catalog(
        &self,
        title: &str,
        language: &str,
        page: i32,
    ) -> Result<SearchPage, ApiError>;
    async fn add_film(&self, req: &AddFilmRequest) -> Result<(), ApiError>;
}

/// HTTP gateway carrying the session cookie. All requests are rooted at
/// `{base_url}/api`.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
}

impl ApiGateway {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            env::var("CINETHEQUE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Single chokepoint for every outbound request. Returns the parsed JSON
    /// body for 2xx responses with a JSON content-type, and `None` for 2xx
    /// responses without one (e.g. DELETE) — a legitimate success signal.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Network failure for {}: {}", url, e);
            ApiError::RequestFailed { status: None }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthLost);
        }
        if !status.is_success() {
            warn!("{} -> {}", url, status);
            return Err(ApiError::RequestFailed {
                status: Some(status.as_u16()),
            });
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(None);
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|_| ApiError::RequestFailed { status: None })?;
        Ok(Some(value))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        match self.call(Method::GET, path, None).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ApiError::RequestFailed { status: None }),
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        match self.call(Method::POST, path, Some(body)).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ApiError::RequestFailed { status: None }),
        }
    }
}

#[async_trait]
impl CatalogApi for ApiGateway {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me").await
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.post_json("/auth/login", json!({ "email": email, "password": password }))
            .await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        self.post_json("/auth/register", serde_json::to_value(req)?)
            .await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.call(Method::POST, "/auth/logout", None).await?;
        Ok(())
    }

    async fn list_films(&self) -> Result<Vec<OwnedFilm>, ApiError> {
        self.get_json("/library").await
    }

    async fn search_library(&self, query: &str) -> Result<Vec<OwnedFilm>, ApiError> {
        let path = format!("/library/search?search={}", urlencoding::encode(query));
        self.get_json(&path).await
    }

    async fn film_detail(&self, id: i32) -> Result<OwnedFilm, ApiError> {
        self.get_json(&format!("/films/{id}")).await
    }

    async fn delete_film(&self, id: i32) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/films/{id}"), None)
            .await?;
        Ok(())
    }

    async fn search_catalog(
        &self,
        title: &str,
        language: &str,
        page: i32,
    ) -> Result<SearchPage, ApiError> {
        let path = format!(
            "/films/search?title={}&language={}&page={}",
            urlencoding::encode(title),
            language,
            page
        );
        let page: SearchPage = self.get_json(&path).await?;
        Ok(page)
    }

    async fn add_film(&self, req: &AddFilmRequest) -> Result<(), ApiError> {
        // The created record is returned by the backend but the client has
        // no use for it: success navigates straight to the library view.
        self.call(Method::POST, "/films", Some(serde_json::to_value(req)?))
            .await?;
        Ok(())
    }
}
