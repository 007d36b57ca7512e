pub mod document;
pub mod rank;
pub mod reorder;

pub use document::{Document, Orderable, ID_FIELD_NAME, ORDER_FIELD_NAME};
pub use rank::{
    FractionalKey, LexoRank, LexoRankGenerator, RankError, RankGenerator, RankScheme, SchemeKind,
    BUCKET_COUNT,
};
pub use reorder::{
    reorder, Change, Direction, IndexRole, MoveDescriptor, MoveSummary, ReorderEngine,
    ReorderError, ReorderOutcome, Selection,
};
