//! Condition tree to bracket-encoded query string
//!
//! ```text
//! filters[$and][0][status][$eq]=published
//! filters[$and][1][$or][0][email][$contains]=acme
//! populate[author]=true
//! populate[comments][populate]=%2A
//! sort=createdAt:DESC
//! ```
//!
//! Values are percent-encoded. Field, operator and logic tokens come from an
//! identifier alphabet and are written as-is.

use super::directives::{PopulateField, SortSpec};
use super::operator::{Logic, Operator};
use super::tree::{ConditionGroup, ConditionTree, FilterNode};

/// Object form of a filter, before bracket encoding
///
/// `Leaf` is `{ field: { $op: value } }`, `Combine` is `{ $and: [...] }` or
/// `{ $or: [...] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Leaf {
        field: String,
        operator: Operator,
        value: String,
    },
    Combine {
        logic: Logic,
        items: Vec<FilterExpr>,
    },
}

impl FilterExpr {
    /// Object form of a whole tree, `None` when nothing survives filtering
    pub fn from_tree(tree: &ConditionTree) -> Option<Self> {
        group_expr(tree.root())
    }

    /// Append the `key=value` pairs of this expression under `filters`
    fn write_pairs(&self, segments: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            FilterExpr::Leaf {
                field,
                operator,
                value,
            } => {
                let mut key = String::from("filters");
                for segment in segments.iter() {
                    push_segment(&mut key, segment);
                }
                for part in field.split('.') {
                    push_segment(&mut key, part);
                }
                push_segment(&mut key, &format!("${}", operator.as_token()));
                out.push(format!("{}={}", key, urlencoding::encode(value)));
            }
            FilterExpr::Combine { logic, items } => {
                segments.push(logic.as_token().to_string());
                for (index, item) in items.iter().enumerate() {
                    segments.push(index.to_string());
                    item.write_pairs(segments, out);
                    segments.pop();
                }
                segments.pop();
            }
        }
    }
}

fn push_segment(key: &mut String, segment: &str) {
    key.push('[');
    key.push_str(segment);
    key.push(']');
}

/// Draft leaves are dropped, empty nested groups are omitted, and a group
/// left with a single plain leaf collapses to that leaf.
fn group_expr(group: &ConditionGroup) -> Option<FilterExpr> {
    let mut items: Vec<FilterExpr> = group
        .children
        .iter()
        .filter_map(|child| match child {
            FilterNode::Condition(condition) if condition.is_complete() => Some(FilterExpr::Leaf {
                field: condition.field.clone(),
                operator: condition.operator.clone(),
                value: condition.value.clone(),
            }),
            FilterNode::Condition(_) => None,
            FilterNode::Group(sub) => group_expr(sub),
        })
        .collect();

    match items.len() {
        0 => None,
        1 if matches!(items[0], FilterExpr::Leaf { .. }) => items.pop(),
        _ => Some(FilterExpr::Combine {
            logic: group.logic,
            items,
        }),
    }
}

/// `filters[...]=value` pairs for a tree, in index order
pub fn encode_filters(tree: &ConditionTree) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(expr) = FilterExpr::from_tree(tree) {
        expr.write_pairs(&mut Vec::new(), &mut out);
    }
    out
}

/// `populate[...]` pairs; a deep field emits only its wildcard form
pub fn encode_populate(fields: &[PopulateField]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| field.is_active() && !field.name.is_empty())
        .map(|field| {
            if field.deep {
                format!("populate[{}][populate]={}", field.name, urlencoding::encode("*"))
            } else {
                format!("populate[{}]=true", field.name)
            }
        })
        .collect()
}

/// Literal `sort=field:DIRECTION` token
pub fn encode_sort(sort: &SortSpec) -> Option<String> {
    if sort.field.is_empty() {
        return None;
    }
    Some(format!("sort={}", sort))
}

/// Full query string: filters, then populate, then sort
///
/// An empty string means no filters, no populate and no sort.
pub fn to_query_string(
    tree: &ConditionTree,
    sort: Option<&SortSpec>,
    populate: &[PopulateField],
) -> String {
    let mut params = encode_filters(tree);
    params.extend(encode_populate(populate));
    params.extend(sort.and_then(encode_sort));
    params.join("&")
}
