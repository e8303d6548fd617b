//! Search route handlers.
//!
//! One routed endpoint wraps the full classify-dispatch-enrich pipeline;
//! three direct endpoints expose the individual strategies as raw ranked
//! lists with no envelope.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use abhilekh_search::{Level, SearchEnvelope, SearchRequest, DEFAULT_PAGE_SIZE};
use abhilekh_store::{Collection, RawFilters};

use crate::error::{error_response, ApiError};
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/search", get(routed_search))
        .route("/search/keyword", get(keyword_search))
        .route("/search/semantic", get(semantic_search))
        .route("/search/combined", get(combined_search))
        .with_state(state)
}

/// Query parameters shared by all search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub from: Option<usize>,
    pub size: Option<usize>,
    /// Level for the direct endpoints: "video" | "snippet"
    #[serde(rename = "type")]
    pub level: Option<String>,
    /// Index name for /search/combined: "videos" | "video_snippets"
    pub index: Option<String>,
    #[serde(rename = "uploadDate")]
    pub upload_date: Option<String>,
    pub location: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    #[serde(rename = "vidID")]
    pub vid_id: Option<String>,
}

impl SearchParams {
    fn filters(&self) -> RawFilters {
        RawFilters {
            upload_date: self.upload_date.clone(),
            location: self.location.clone(),
            tags: self
                .tags
                .as_deref()
                .map(|t| {
                    t.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            vid_id: self.vid_id.clone(),
        }
    }

    fn query(&self) -> String {
        self.query.clone().unwrap_or_default()
    }

    fn from(&self) -> usize {
        self.from.unwrap_or(0)
    }

    fn size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Level from the `type` parameter; defaults to video.
    fn parse_level(&self) -> Result<Level, ApiError> {
        match self.level.as_deref() {
            None | Some("video") => Ok(Level::Video),
            Some("snippet") => Ok(Level::Snippet),
            Some(other) => Err((
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Invalid type '{other}'; expected 'video' or 'snippet'")
                })),
            )),
        }
    }

    /// Level from the `index` parameter; defaults to videos.
    fn parse_index(&self) -> Result<Level, ApiError> {
        match self.index.as_deref() {
            None => Ok(Level::Video),
            Some(name) => match Collection::parse(name) {
                Some(Collection::Videos) => Ok(Level::Video),
                Some(Collection::Snippets) => Ok(Level::Snippet),
                None => Err((
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!(
                            "Invalid index '{name}'; expected 'videos' or 'video_snippets'"
                        )
                    })),
                )),
            },
        }
    }
}

/// GET /search: classify, dispatch, and envelope.
pub async fn routed_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let request = SearchRequest {
        query: params.query(),
        from: params.from(),
        size: params.size(),
        filters: params.filters(),
    };

    state
        .router
        .search(&request)
        .await
        .map(Json)
        .map_err(|e| error_response(e, state.expose_errors))
}

/// GET /search/keyword: raw lexical ranked list.
pub async fn keyword_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let level = params.parse_level()?;
    state
        .router
        .keyword_search(
            &params.query(),
            level,
            &params.filters(),
            params.from(),
            params.size(),
        )
        .await
        .map(Json)
        .map_err(|e| error_response(e, state.expose_errors))
}

/// GET /search/semantic: raw vector-similarity ranked list.
pub async fn semantic_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let level = params.parse_level()?;
    state
        .router
        .semantic_search(
            &params.query(),
            level,
            &params.filters(),
            params.from(),
            params.size(),
        )
        .await
        .map(Json)
        .map_err(|e| error_response(e, state.expose_errors))
}

/// GET /search/combined: raw hybrid ranked list.
pub async fn combined_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let level = params.parse_index()?;
    state
        .router
        .combined_search(
            &params.query(),
            level,
            &params.filters(),
            params.from(),
            params.size(),
        )
        .await
        .map(Json)
        .map_err(|e| error_response(e, state.expose_errors))
}
