//! Handlers of the project countdown data.
//!
//! The collection is stored as one JSON array per user and always moves as a
//! whole: `GET` returns it, `POST` overwrites it.

use axum::{Extension, Json, body::Bytes, extract::State};
use sea_orm::{ActiveModelTrait, ActiveValue};

use api_types::{
    SaveResponse,
    project::{Project, ProjectsPayload},
    settings::CountdownSettings,
};

use crate::{ServerError, server::ServerState, user};

const INVALID_FORMAT: &str = "Invalid data format";
const SAVE_FAILED: &str = "Failed to save data";

fn to_wire(project: engine::Project) -> Project {
    Project {
        id: project.id,
        name: project.name,
        deadline: project.deadline,
        is_important: project.is_important,
    }
}

/// Return the stored collection, or an empty one when nothing readable is
/// stored.
pub async fn get(Extension(user): Extension<user::Model>) -> Json<ProjectsPayload> {
    let projects = engine::blob::decode(user.project_countdown_data.as_deref());
    tracing::debug!("{} loaded {} projects", user.username, projects.len());

    Json(ProjectsPayload {
        projects: projects.into_iter().map(to_wire).collect(),
    })
}

/// Overwrite the stored collection.
///
/// The body must be `{"projects": [...]}` with well-formed projects, otherwise
/// nothing is written.
pub async fn save(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ServerError> {
    let payload: ProjectsPayload = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!("rejected payload from {}: {err}", user.username);
        ServerError::Generic(INVALID_FORMAT.to_string())
    })?;

    let count = payload.projects.len();
    if count > state.countdown.max_projects_per_user {
        tracing::warn!(
            "{} saved {count} projects, above the limit of {}",
            user.username,
            state.countdown.max_projects_per_user
        );
    }
    let blob = serde_json::to_string(&payload.projects)
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    let username = user.username.clone();
    let mut user: user::ActiveModel = user.into();
    user.project_countdown_data = ActiveValue::Set(Some(blob));
    user.update(&state.db)
        .await
        .map_err(ServerError::storage(SAVE_FAILED))?;

    tracing::info!("{username} saved {count} projects");
    Ok(Json(SaveResponse { success: true }))
}

pub async fn settings(State(state): State<ServerState>) -> Json<CountdownSettings> {
    Json(CountdownSettings {
        max_projects_per_user: state.countdown.max_projects_per_user,
    })
}
