//! Channel endpoints
//!
//! Listing, creation, mutation and history of channels.
//!
//! | Endpoint | Notes |
//! |----------|-------|
//! | `GET /api/channels` | Registration order |
//! | `POST /api/channels` | Backfilled from `stdin` history |
//! | `PATCH /api/channels/{id}` | Not allowed on immutable IDs |
//! | `DELETE /api/channels/{id}` | Not allowed on undeletable IDs |
//! | `GET /api/channels/{id}/history` | JSON records, oldest first |
//! | `GET /api/channels/{id}/plain` | Content lines only |
//! | `POST /api/validate-filter` | Raw pattern in the body |

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use sift_channels::{Channel, ChannelInfo, Line, LineFilter};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request/Response types
// =============================================================================

/// Create channel request
#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub replace: String,
}

/// Update channel request
///
/// Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateChannelRequest {
    pub name: Option<String>,
    pub filter: Option<String>,
    pub replace: Option<String>,
}

/// Which fields an update actually changed
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChannelResponse {
    pub name_updated: bool,
    pub filter_updated: bool,
    pub replace_updated: bool,
}

/// Channel response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub name: String,
    pub id: String,
    /// Label of the attached sink (empty if none)
    pub output_filename: String,
    pub filter: String,
    pub replace: String,
}

impl From<ChannelInfo> for ChannelResponse {
    fn from(info: ChannelInfo) -> Self {
        Self {
            name: info.name,
            id: info.id,
            output_filename: info.sink_label,
            filter: info.filter,
            replace: info.replace,
        }
    }
}

/// List channels response
#[derive(Debug, Serialize)]
pub struct ListChannelsResponse {
    pub channels: Vec<ChannelResponse>,
}

// =============================================================================
// Routes
// =============================================================================

/// Channel routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/channels", get(list_channels).post(create_channel))
        .route("/api/channels/{id}", patch(update_channel).delete(delete_channel))
        .route("/api/channels/{id}/history", get(channel_history))
        .route("/api/channels/{id}/plain", get(channel_plain))
        .route("/api/validate-filter", post(validate_filter))
}

// =============================================================================
// Handlers
// =============================================================================

/// List all channels
///
/// GET /api/channels
async fn list_channels(State(state): State<AppState>) -> Json<ListChannelsResponse> {
    Json(ListChannelsResponse {
        channels: state
            .registry
            .list()
            .into_iter()
            .map(ChannelResponse::from)
            .collect(),
    })
}

/// Create a channel
///
/// POST /api/channels
///
/// The new channel starts with every retained `stdin` line that passes its
/// filter.
async fn create_channel(
    State(state): State<AppState>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }

    let filter = LineFilter::parse(&req.filter)?;
    let channel = Channel::new(req.name, filter)
        .with_options(state.options)
        .with_replace(req.replace);

    let channel = state.registry.add(channel)?;

    Ok((StatusCode::CREATED, Json(channel.info().into())))
}

/// Update a channel's name, filter or replace template
///
/// PATCH /api/channels/{id}
///
/// The filter is validated before anything is applied, so a bad pattern
/// leaves the channel unchanged.
async fn update_channel(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<UpdateChannelRequest>,
) -> Result<Json<UpdateChannelResponse>, ApiError> {
    if !state.protected.can_modify(&id) {
        return Err(ApiError::forbidden(format!("channel '{}' is read-only", id)));
    }

    let channel = state.registry.lookup(&id)?;

    if req.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::bad_request("name must not be empty"));
    }

    if let Some(ref filter) = req.filter {
        LineFilter::compile(filter)?;
    }

    let mut response = UpdateChannelResponse::default();

    if let Some(name) = req.name
        && name != channel.name()
    {
        info!(channel_id = %id, %name, "channel renamed");
        channel.set_name(name);
        response.name_updated = true;
    }

    if let Some(ref filter) = req.filter {
        response.filter_updated = channel.set_filter(filter)?;
    }

    if let Some(replace) = req.replace {
        response.replace_updated = channel.set_replace(replace);
    }

    Ok(Json(response))
}

/// Delete a channel
///
/// DELETE /api/channels/{id}
///
/// Live subscribers see their stream end.
async fn delete_channel(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if !state.protected.can_delete(&id) {
        return Err(ApiError::forbidden(format!(
            "channel '{}' cannot be deleted",
            id
        )));
    }

    state
        .registry
        .remove(&id)
        .ok_or_else(|| ApiError::not_found("channel", &id))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Channel history as JSON
///
/// GET /api/channels/{id}/history
async fn channel_history(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Line>>, ApiError> {
    let channel = state.registry.lookup(&id)?;
    Ok(Json(channel.history()))
}

/// Channel history as a plain-text download
///
/// GET /api/channels/{id}/plain
///
/// Event markers are left out; each content line ends with a newline.
async fn channel_plain(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = state.registry.lookup(&id)?;

    let body: String = channel
        .history()
        .into_iter()
        .filter(|line| !line.is_event())
        .map(|line| line.text + "\n")
        .collect();

    let disposition = attachment_disposition(&channel.name());

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// `Content-Disposition` value naming the download after the channel
///
/// Quotes and backslashes are escaped inside the quoted-string. Control
/// characters cannot appear in a header value and become `_`.
fn attachment_disposition(name: &str) -> String {
    let mut filename = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                filename.push('\\');
                filename.push(c);
            }
            c if c.is_control() => filename.push('_'),
            c => filename.push(c),
        }
    }
    format!("attachment; filename=\"{}.txt\"", filename)
}

/// Check that a filter pattern compiles
///
/// POST /api/validate-filter
async fn validate_filter(body: String) -> Result<StatusCode, ApiError> {
    LineFilter::compile(&body)?;
    Ok(StatusCode::NO_CONTENT)
}
