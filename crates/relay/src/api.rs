//! Request and response shapes shared by the CLI and the MCP tools.

use crate::config::OrderingConfig;
use anyhow::{bail, Context, Result};
use rank_core::{
    Document, MoveDescriptor, RankGenerator, ReorderEngine, SchemeKind, Selection,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A drop position as sent by drag-and-drop UIs: either a bare index or
/// `{"index": n}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DragPosition {
    Index(usize),
    Location { index: usize },
}

impl DragPosition {
    pub fn index(self) -> usize {
        match self {
            DragPosition::Index(index) | DragPosition::Location { index } => index,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReorderRequest {
    pub entities: Vec<Document>,
    #[serde(alias = "selectedIds")]
    pub selected_ids: Vec<String>,
    pub source: DragPosition,
    pub destination: DragPosition,
    #[serde(default)]
    pub scheme: Option<SchemeKind>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub new_order: Vec<Document>,
    /// `[id, {"set": {"orderRank": key}}]` pairs, one per moved document.
    pub patches: Vec<(String, Value)>,
    pub message: String,
}

/// Run one reorder request against the configured key space.
pub fn reorder(ordering: &OrderingConfig, request: ReorderRequest) -> Result<ReorderResponse> {
    if request.entities.len() > ordering.max_documents {
        bail!(
            "Too many documents: {} (limit {})",
            request.entities.len(),
            ordering.max_documents
        );
    }

    let scheme = ordering.rank_scheme(request.scheme)?;
    let selection: Selection = request.selected_ids.into_iter().collect();
    let movement = MoveDescriptor::new(request.source.index(), request.destination.index());

    let outcome = ReorderEngine::new(scheme)
        .reorder(request.entities, &selection, movement)
        .context("Reorder failed")?;

    tracing::info!(
        moved = outcome.changes.len(),
        scheme = %scheme.kind(),
        "{}",
        outcome.message
    );

    Ok(ReorderResponse {
        patches: outcome.patches(),
        new_order: outcome.new_order,
        message: outcome.message,
    })
}

/// `count` evenly spread keys for seeding an unranked list.
pub fn generate_ranks(
    ordering: &OrderingConfig,
    count: usize,
    scheme: Option<SchemeKind>,
) -> Result<Vec<String>> {
    if count > ordering.max_documents {
        bail!(
            "Too many keys requested: {} (limit {})",
            count,
            ordering.max_documents
        );
    }
    let scheme = ordering.rank_scheme(scheme)?;
    let keys = scheme.spread_keys(count)?;
    tracing::debug!(count, scheme = %scheme.kind(), "Generated seed keys");
    Ok(keys)
}
