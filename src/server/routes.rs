use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppState;
use crate::error::Error;
use crate::query::{self, normalize_name, Registration};
use crate::writer::{open_read_only, open_read_write};

pub type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Clone, Copy)]
enum Access {
    ReadOnly,
    ReadWrite,
}

/// Health check
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Pokedex API is running" }))
}

/// List pokemon names with an ability
pub async fn pokemon_by_ability(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let ability = normalize_name(&name).map_err(error_response)?;
    let names = blocking(&state, Access::ReadOnly, move |conn| {
        query::pokemon_by_ability(conn, &ability)
    })
    .await?;
    Ok(Json(names))
}

/// List pokemon names of a type, primary or secondary
pub async fn pokemon_by_type(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let type_name = normalize_name(&name).map_err(error_response)?;
    let names = blocking(&state, Access::ReadOnly, move |conn| {
        query::pokemon_by_type(conn, &type_name)
    })
    .await?;
    Ok(Json(names))
}

/// List trainers holding a pokemon
pub async fn trainers_by_pokemon(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let pokemon = normalize_name(&name).map_err(error_response)?;
    let names = blocking(&state, Access::ReadOnly, move |conn| {
        query::trainers_by_pokemon(conn, &pokemon)
    })
    .await?;
    Ok(Json(names))
}

/// List abilities of a pokemon
pub async fn abilities_by_pokemon(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let pokemon = normalize_name(&name).map_err(error_response)?;
    let names = blocking(&state, Access::ReadOnly, move |conn| {
        query::abilities_by_pokemon(conn, &pokemon)
    })
    .await?;
    Ok(Json(names))
}

/// Register a new pokemon with a trainer, looking its types and abilities up
/// from the species provider
pub async fn register(
    State(state): State<Arc<AppState>>,
    Path((pokemon_name, trainer_name)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    // Reject malformed names before touching storage
    normalize_name(&pokemon_name).map_err(error_response)?;
    normalize_name(&trainer_name).map_err(error_response)?;

    let species = Arc::clone(&state.species);
    let registration = blocking(&state, Access::ReadWrite, move |conn| {
        query::register_pokemon(conn, species.as_ref(), &pokemon_name, &trainer_name)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Run `work` on the blocking pool against a fresh connection
async fn blocking<T, F>(state: &AppState, access: Access, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> crate::Result<T> + Send + 'static,
{
    let db_path = state.db_path.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = match access {
            Access::ReadOnly => open_read_only(&db_path)?,
            Access::ReadWrite => open_read_write(&db_path)?,
        };
        work(&mut conn)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "blocking task failed");
        internal_error()
    })?
    .map_err(error_response)
}

/// Client errors carry their message; everything else is logged and hidden
pub fn error_response(err: Error) -> ApiError {
    match err {
        Error::Validation(detail) => client_error(StatusCode::UNPROCESSABLE_ENTITY, detail),
        Error::NotFound(detail) => client_error(StatusCode::NOT_FOUND, detail),
        Error::Conflict(detail) => client_error(StatusCode::CONFLICT, detail),
        other => {
            tracing::error!(error = %other, "request failed");
            internal_error()
        }
    }
}

fn client_error(status: StatusCode, detail: String) -> ApiError {
    (status, Json(json!({ "detail": detail })))
}

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "internal server error" })),
    )
}
