//! Filter query engine
//!
//! Translates between a nested AND/OR [`ConditionTree`] (plus a sort key and
//! relation populate directives) and the bracket-encoded query string a
//! content-manager list view reads from its URL.
//!
//! ```rust
//! use magic_mark::query::{ConditionKey, ConditionTree, ROOT_ID, parse_query, to_query_string};
//!
//! let tree = ConditionTree::new()
//!     .update_condition("condition_1", ConditionKey::Field, "status")
//!     .update_condition("condition_1", ConditionKey::Value, "published");
//!
//! let query = to_query_string(&tree, None, &[]);
//! assert_eq!(query, "filters[status][$eq]=published");
//!
//! let parsed = parse_query(&query);
//! assert_eq!(parsed.tree.logical_leaves(), tree.logical_leaves());
//! # let _ = ROOT_ID;
//! ```
//!
//! Everything here is synchronous and pure.

pub mod decode;
pub mod directives;
pub mod display;
pub mod encode;
pub mod operator;
pub mod tree;

pub use decode::{MAX_FILTER_DEPTH, ParsedQuery, parse_query, parse_tree};
pub use directives::{PopulateField, SortDirection, SortSpec};
pub use display::{FilterChip, QueryPreview, describe};
pub use encode::{FilterExpr, to_query_string};
pub use operator::{Logic, Operator};
pub use tree::{
    Condition, ConditionGroup, ConditionKey, ConditionTree, FilterNode, LogicalLeaf, ROOT_ID,
};

/// Errors raised when a condition tree is built from untrusted JSON
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("duplicate node id '{0}' in condition tree")]
    DuplicateId(String),

    #[error("condition tree node with an empty id")]
    EmptyId,
}
