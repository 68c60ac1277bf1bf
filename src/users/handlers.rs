use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{is_falsy, PublicUser, RegisterRequest},
        password::{hash_password, validate_password},
        repo_types::NewUser,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

fn missing(field: &str) -> AppError {
    warn!(field, "missing required field");
    AppError::validation(format!("Missing '{}' in request body", field))
}

fn string_field<'a>(value: &'a Value, field: &str) -> AppResult<&'a str> {
    value.as_str().ok_or_else(|| {
        warn!(field, "field is not a string");
        AppError::validation(format!("'{}' must be a string", field))
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<PublicUser>)> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "rejected request body");
        AppError::validation(e.body_text())
    })?;

    let required = [
        ("full_name", &payload.full_name),
        ("user_name", &payload.user_name),
        ("password", &payload.password),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| is_falsy(value)) {
        return Err(missing(field));
    }

    let full_name = string_field(&payload.full_name, "full_name")?;
    let user_name = string_field(&payload.user_name, "user_name")?;
    let password = string_field(&payload.password, "password")?;
    let nickname = match &payload.nickname {
        v if is_falsy(v) => None,
        v => Some(string_field(v, "nickname")?.to_owned()),
    };

    if let Some(msg) = validate_password(password) {
        warn!(user_name, "password rejected by policy");
        return Err(AppError::validation(msg));
    }

    if state.users.exists_by_user_name(user_name).await? {
        warn!(user_name, "user name already taken");
        return Err(AppError::validation("Username already taken"));
    }

    let plain = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task")??;

    let user = state
        .users
        .insert(NewUser {
            user_name: user_name.to_owned(),
            password: hash,
            full_name: full_name.to_owned(),
            nickname,
            date_created: OffsetDateTime::now_utc(),
        })
        .await?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), user.id);

    info!(user_id = %user.id, user_name = %user.user_name, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PublicUser::from(&user)),
    ))
}
