//! Template catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use crate::template::{Size, TemplateDefinition};

use super::super::state::AppState;
use super::ApiError;

/// Catalog entry summary.
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub size: Size,
    pub fields: Vec<String>,
}

/// GET /api/templates - List preset templates.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<TemplateSummary>> {
    let summaries = state
        .catalog
        .iter()
        .map(|(id, t)| TemplateSummary {
            id: id.to_string(),
            name: t.name.clone(),
            size: t.native_size,
            fields: t.field_names().map(str::to_string).collect(),
        })
        .collect();
    Json(summaries)
}

/// GET /api/template/:id - One preset, in catalog wire format.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateDefinition>, ApiError> {
    let template = state.catalog.get(&id)?;
    Ok(Json(template.clone()))
}
