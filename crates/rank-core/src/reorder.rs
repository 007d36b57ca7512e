//! Drag-and-drop reordering over fractional order keys.
//!
//! A move re-keys only the selected documents. Their new keys are squeezed
//! into the gap beside the document at the drop position (the anchor), so no
//! other document ever needs a write.

use crate::document::{Orderable, ORDER_FIELD_NAME};
use crate::rank::{RankError, RankGenerator, RankScheme};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Identifiers of the documents dragged together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Source and destination positions (0-based) of a drag, both indexing the
/// list as it was before the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub source: usize,
    pub destination: usize,
}

impl MoveDescriptor {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn is_moving_up(&self) -> bool {
        self.source > self.destination
    }

    pub fn direction(&self) -> Direction {
        if self.is_moving_up() {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// New order key for one moved document; the only write a move needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: String,
    pub order_key: String,
}

impl Change {
    /// `(id, {"set": {"orderRank": key}})`, the patch shape the content
    /// backend accepts. Serializes as a two-element JSON array.
    pub fn to_patch(&self) -> (String, Value) {
        (
            self.id.clone(),
            json!({ "set": { ORDER_FIELD_NAME: self.order_key } }),
        )
    }
}

/// Human-facing description of a move, with 1-based positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveSummary {
    pub count: usize,
    pub direction: Direction,
    pub from: usize,
    pub to: usize,
}

impl MoveSummary {
    fn new(count: usize, movement: MoveDescriptor) -> Self {
        Self {
            count,
            direction: movement.direction(),
            from: movement.source + 1,
            to: movement.destination + 1,
        }
    }
}

impl fmt::Display for MoveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.count == 1 { "Document" } else { "Documents" };
        write!(
            f,
            "Moved {} {} {} from position {} to {}",
            self.count, noun, self.direction, self.from, self.to
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderOutcome<T> {
    /// Every input document, sorted by order key.
    pub new_order: Vec<T>,
    /// One entry per moved document, in their original relative order.
    pub changes: Vec<Change>,
    pub message: String,
}

impl<T> ReorderOutcome<T> {
    pub fn patches(&self) -> Vec<(String, Value)> {
        self.changes.iter().map(Change::to_patch).collect()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexRole {
    Source,
    Destination,
}

impl fmt::Display for IndexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexRole::Source => f.write_str("source"),
            IndexRole::Destination => f.write_str("destination"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("cannot reorder an empty list")]
    EmptyList,

    #[error("{role} index {index} is out of bounds for a list of {len}")]
    InvalidIndex {
        role: IndexRole,
        index: usize,
        len: usize,
    },

    #[error("none of the selected documents are in the list")]
    EmptySelection,

    #[error("document id {0:?} appears more than once")]
    DuplicateId(String),

    #[error("destination {index} holds selected document {id:?}; drop position must be an unselected document")]
    AnchorSelected { index: usize, id: String },

    #[error(transparent)]
    Rank(#[from] RankError),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless reorder engine over a rank generator.
#[derive(Clone, Debug, Default)]
pub struct ReorderEngine<G> {
    ranks: G,
}

/// Order keys around the drop position, read before anything moves.
struct AnchorKeys {
    prev: String,
    current: String,
    next: String,
}

impl<G: RankGenerator> ReorderEngine<G> {
    pub fn new(ranks: G) -> Self {
        Self { ranks }
    }

    pub fn ranks(&self) -> &G {
        &self.ranks
    }

    /// Move the selected documents to `movement.destination`.
    ///
    /// Moving up places them just before the anchor, moving down just after
    /// it. Unselected documents keep their keys and stay in the output.
    pub fn reorder<T: Orderable>(
        &self,
        entities: Vec<T>,
        selection: &Selection,
        movement: MoveDescriptor,
    ) -> Result<ReorderOutcome<T>, ReorderError> {
        let moved_count = validate(&entities, selection, movement)?;
        let direction = movement.direction();
        let destination = movement.destination;

        let anchor = self.anchor_keys(&entities, destination);
        let new_keys = self.assign_keys(&anchor, direction, moved_count)?;
        tracing::debug!(
            anchor = entities[destination].id(),
            %direction,
            moved = moved_count,
            prev = %anchor.prev,
            current = %anchor.current,
            next = %anchor.next,
            "Assigned order keys for move"
        );

        // Pull the selection out in list order, then splice it back in
        // beside the anchor.
        let mut selected = Vec::with_capacity(moved_count);
        let mut remaining = Vec::with_capacity(entities.len() - moved_count);
        for (index, entity) in entities.into_iter().enumerate() {
            if selection.contains(entity.id()) {
                selected.push(entity);
            } else {
                remaining.push((index, entity));
            }
        }

        let mut changes = Vec::with_capacity(moved_count);
        for (entity, key) in selected.iter_mut().zip(new_keys) {
            changes.push(Change {
                id: entity.id().to_string(),
                order_key: key.clone(),
            });
            entity.set_order_key(key);
        }

        let mut new_order = Vec::with_capacity(remaining.len() + selected.len());
        let mut selected = Some(selected);
        for (index, entity) in remaining {
            if index != destination {
                new_order.push(entity);
                continue;
            }
            let block = selected.take().unwrap_or_default();
            match direction {
                Direction::Up => {
                    new_order.extend(block);
                    new_order.push(entity);
                }
                Direction::Down => {
                    new_order.push(entity);
                    new_order.extend(block);
                }
            }
        }

        // The splice above is already ordered; sorting keeps the output
        // consistent with the keys actually assigned.
        new_order.sort_by(|a, b| a.order_key().cmp(b.order_key()));

        Ok(ReorderOutcome {
            new_order,
            changes,
            message: MoveSummary::new(moved_count, movement).to_string(),
        })
    }

    fn anchor_keys<T: Orderable>(&self, entities: &[T], destination: usize) -> AnchorKeys {
        // A neighbour without a key counts as no neighbour.
        let neighbour_key = |index: Option<usize>| {
            index
                .and_then(|i| entities.get(i))
                .map(Orderable::order_key)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        };

        AnchorKeys {
            prev: neighbour_key(destination.checked_sub(1))
                .unwrap_or_else(|| self.ranks.minimum_key()),
            current: entities[destination].order_key().to_string(),
            next: neighbour_key(destination.checked_add(1))
                .unwrap_or_else(|| self.ranks.maximum_key()),
        }
    }

    /// Keys for the moved block, ascending, all inside the gap beside the
    /// anchor. Each key narrows the lower bound for the next one.
    fn assign_keys(
        &self,
        anchor: &AnchorKeys,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<String>, RankError> {
        let (mut low, high) = match direction {
            Direction::Up => (anchor.prev.clone(), anchor.current.as_str()),
            Direction::Down => (anchor.current.clone(), anchor.next.as_str()),
        };

        let mut keys = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.ranks.key_between(&low, high)?;
            low.clone_from(&key);
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Check the move against the list; returns how many documents move.
fn validate<T: Orderable>(
    entities: &[T],
    selection: &Selection,
    movement: MoveDescriptor,
) -> Result<usize, ReorderError> {
    let len = entities.len();
    if len == 0 {
        return Err(ReorderError::EmptyList);
    }
    for (role, index) in [
        (IndexRole::Source, movement.source),
        (IndexRole::Destination, movement.destination),
    ] {
        if index >= len {
            return Err(ReorderError::InvalidIndex { role, index, len });
        }
    }

    let mut seen = HashSet::with_capacity(len);
    for entity in entities {
        if !seen.insert(entity.id()) {
            return Err(ReorderError::DuplicateId(entity.id().to_string()));
        }
    }

    let moved = entities
        .iter()
        .filter(|entity| selection.contains(entity.id()))
        .count();
    if moved == 0 {
        return Err(ReorderError::EmptySelection);
    }

    let anchor = &entities[movement.destination];
    if selection.contains(anchor.id()) {
        return Err(ReorderError::AnchorSelected {
            index: movement.destination,
            id: anchor.id().to_string(),
        });
    }

    Ok(moved)
}

/// Reorder with the default LexoRank key space (bucket 0).
pub fn reorder<T: Orderable>(
    entities: Vec<T>,
    selection: &Selection,
    movement: MoveDescriptor,
) -> Result<ReorderOutcome<T>, ReorderError> {
    ReorderEngine::new(RankScheme::default()).reorder(entities, selection, movement)
}
