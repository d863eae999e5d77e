//! Column profiling handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use gapwise::{ColumnType, DataProfile, GapwiseError, Row, RowSet};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for the profile endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub data: Vec<Row>,
    /// Column types chosen by the user.
    #[serde(default)]
    pub user_classified: IndexMap<String, ColumnType>,
}

/// Classify every column of the posted rows and analyze its quality.
pub async fn profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<DataProfile>, ApiError> {
    let Json(request) = payload?;
    if request.data.is_empty() {
        return Err(GapwiseError::EmptyData("no rows to profile".to_string()).into());
    }

    let data = RowSet::from_rows(request.data);
    if let Some(column) = request
        .user_classified
        .keys()
        .find(|column| !data.has_column(column))
    {
        return Err(GapwiseError::MissingColumn {
            column: column.clone(),
            context: "type set for a column not in the data".to_string(),
        }
        .into());
    }

    let gapwise = state.gapwise.clone();
    let user_types = request.user_classified;
    let profile = tokio::task::spawn_blocking(move || gapwise.profile(&data, &user_types)).await?;
    Ok(Json(profile))
}
