//! Condition tree model
//!
//! A [`ConditionTree`] is an immutable value: every edit returns a new tree.
//! Nodes live behind [`Arc`], so an edit clones only the groups on the path
//! from the root to the edited node and shares every other subtree with the
//! previous version. Holding on to an older tree (undo history, a pending
//! render) is therefore cheap.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::QueryError;
use super::operator::{Logic, Operator};

/// Id of the root group of a freshly built tree
pub const ROOT_ID: &str = "root";

/// Leaf predicate: `field operator value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: Operator,
    /// Always held decoded; encoding happens on serialization
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(
        id: impl Into<String>,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// A draft leaf with no field and no value
    pub fn blank(id: impl Into<String>) -> Self {
        Self::new(id, "", Operator::Eq, "")
    }

    /// Drafts (missing field or value) are skipped by the serializer
    pub fn is_complete(&self) -> bool {
        !self.field.is_empty() && !self.value.is_empty()
    }
}

/// AND/OR container of conditions and nested groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub id: String,
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub children: Vec<FilterNode>,
}

impl ConditionGroup {
    pub fn new(id: impl Into<String>, logic: Logic, children: Vec<FilterNode>) -> Self {
        Self {
            id: id.into(),
            logic,
            children,
        }
    }

    /// Number of children that contribute to the serialized filter
    ///
    /// Complete leaves count, nested groups count when they contribute
    /// something themselves.
    pub fn effective_len(&self) -> usize {
        self.children
            .iter()
            .filter(|child| match child {
                FilterNode::Condition(condition) => condition.is_complete(),
                FilterNode::Group(group) => group.effective_len() > 0,
            })
            .count()
    }
}

/// A node of the tree: leaf condition or nested group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterNode {
    Condition(Arc<Condition>),
    Group(Arc<ConditionGroup>),
}

impl FilterNode {
    pub fn id(&self) -> &str {
        match self {
            FilterNode::Condition(condition) => &condition.id,
            FilterNode::Group(group) => &group.id,
        }
    }

    pub fn condition(condition: Condition) -> Self {
        FilterNode::Condition(Arc::new(condition))
    }

    pub fn group(group: ConditionGroup) -> Self {
        FilterNode::Group(Arc::new(group))
    }
}

/// Which attribute of a leaf an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKey {
    Field,
    Operator,
    Value,
}

/// A complete leaf together with the logic of the groups that combine it
///
/// Groups holding fewer than two contributing children are transparent and
/// do not appear in `logic_path`: they have no effect on matching and the
/// serializer unwraps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLeaf {
    pub logic_path: Vec<Logic>,
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

/// Nested AND/OR filter expression with exactly one root group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ConditionGroup", into = "ConditionGroup")]
pub struct ConditionTree {
    root: Arc<ConditionGroup>,
    next_id: u64,
}

impl Default for ConditionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConditionTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl TryFrom<ConditionGroup> for ConditionTree {
    type Error = QueryError;

    fn try_from(root: ConditionGroup) -> Result<Self, Self::Error> {
        Self::from_root(root)
    }
}

impl From<ConditionTree> for ConditionGroup {
    fn from(tree: ConditionTree) -> Self {
        Arc::unwrap_or_clone(tree.root)
    }
}

impl ConditionTree {
    /// Fresh tree: an AND root holding one blank condition
    pub fn new() -> Self {
        let root = ConditionGroup::new(
            ROOT_ID,
            Logic::And,
            vec![FilterNode::condition(Condition::blank("condition_1"))],
        );
        Self {
            root: Arc::new(root),
            next_id: 2,
        }
    }

    /// Build a tree around an existing root, checking id uniqueness
    pub fn from_root(root: ConditionGroup) -> Result<Self, QueryError> {
        let mut seen = HashSet::new();
        check_ids(&root, &mut seen)?;
        let next_id = seen.len() as u64 + 1;
        Ok(Self {
            root: Arc::new(root),
            next_id,
        })
    }

    /// Used by the decoder, which allocates ids itself
    pub(crate) fn from_parts(root: ConditionGroup, next_id: u64) -> Self {
        Self {
            root: Arc::new(root),
            next_id,
        }
    }

    pub fn root(&self) -> &ConditionGroup {
        &self.root
    }

    /// Whether any leaf would survive serialization
    pub fn has_filters(&self) -> bool {
        self.root.effective_len() > 0
    }

    /// Depth-first search for a group
    pub fn find_group(&self, id: &str) -> Option<&ConditionGroup> {
        find_group_in(&self.root, id)
    }

    /// Depth-first search for a leaf condition
    pub fn find_condition(&self, id: &str) -> Option<&Condition> {
        find_condition_in(&self.root, id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_group(id).is_some() || self.find_condition(id).is_some()
    }

    /// Nesting depth of a group, the root being depth 0
    pub fn group_depth(&self, id: &str) -> Option<usize> {
        path_to_group(&self.root, id).map(|path| path.len())
    }

    /// Append a blank condition to a group
    ///
    /// An unknown group id leaves the tree unchanged.
    pub fn add_condition(&self, group_id: &str) -> Self {
        let mut next_id = self.next_id;
        let id = self.allocate("condition", &mut next_id);
        self.edit_group(group_id, next_id, |group| {
            group
                .children
                .push(FilterNode::condition(Condition::blank(id)));
        })
    }

    /// Append a nested AND group holding one blank condition
    pub fn add_group(&self, parent_group_id: &str) -> Self {
        let mut next_id = self.next_id;
        let group_id = self.allocate("group", &mut next_id);
        let condition_id = self.allocate("condition", &mut next_id);
        self.edit_group(parent_group_id, next_id, |group| {
            group.children.push(FilterNode::group(ConditionGroup::new(
                group_id,
                Logic::And,
                vec![FilterNode::condition(Condition::blank(condition_id))],
            )));
        })
    }

    /// Remove a direct child of a group
    ///
    /// The model lets any group become empty, the root included.
    pub fn remove_child(&self, group_id: &str, child_id: &str) -> Self {
        self.edit_group(group_id, self.next_id, |group| {
            group.children.retain(|child| child.id() != child_id);
        })
    }

    /// Set the field, operator or value of a leaf
    pub fn update_condition(&self, condition_id: &str, key: ConditionKey, value: &str) -> Self {
        let Some((path, index)) = locate_condition(&self.root, condition_id) else {
            tracing::debug!(condition_id, "update on unknown condition ignored");
            return self.clone();
        };
        let root = rebuild(&self.root, &path, |group| {
            if let Some(FilterNode::Condition(condition)) = group.children.get(index) {
                let mut updated = (**condition).clone();
                match key {
                    ConditionKey::Field => updated.field = value.to_string(),
                    ConditionKey::Operator => updated.operator = Operator::from_token(value),
                    ConditionKey::Value => updated.value = value.to_string(),
                }
                group.children[index] = FilterNode::condition(updated);
            }
        });
        Self {
            root,
            next_id: self.next_id,
        }
    }

    /// Flip AND and OR on one group, leaving its ancestors and descendants alone
    pub fn toggle_group_logic(&self, group_id: &str) -> Self {
        self.edit_group(group_id, self.next_id, |group| {
            group.logic = group.logic.toggled();
        })
    }

    /// Complete leaves in document order with their effective logic path
    pub fn logical_leaves(&self) -> Vec<LogicalLeaf> {
        let mut leaves = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut leaves);
        leaves
    }

    fn edit_group(
        &self,
        group_id: &str,
        next_id: u64,
        edit: impl FnOnce(&mut ConditionGroup),
    ) -> Self {
        match path_to_group(&self.root, group_id) {
            Some(path) => Self {
                root: rebuild(&self.root, &path, edit),
                next_id,
            },
            None => {
                tracing::debug!(group_id, "edit on unknown group ignored");
                self.clone()
            }
        }
    }

    fn allocate(&self, prefix: &str, next_id: &mut u64) -> String {
        loop {
            let id = format!("{}_{}", prefix, next_id);
            *next_id += 1;
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

fn check_ids<'a>(group: &'a ConditionGroup, seen: &mut HashSet<&'a str>) -> Result<(), QueryError> {
    if group.id.is_empty() {
        return Err(QueryError::EmptyId);
    }
    if !seen.insert(&group.id) {
        return Err(QueryError::DuplicateId(group.id.clone()));
    }
    for child in &group.children {
        match child {
            FilterNode::Condition(condition) => {
                if condition.id.is_empty() {
                    return Err(QueryError::EmptyId);
                }
                if !seen.insert(&condition.id) {
                    return Err(QueryError::DuplicateId(condition.id.clone()));
                }
            }
            FilterNode::Group(sub) => check_ids(sub, seen)?,
        }
    }
    Ok(())
}

fn find_group_in<'a>(group: &'a ConditionGroup, id: &str) -> Option<&'a ConditionGroup> {
    if group.id == id {
        return Some(group);
    }
    group.children.iter().find_map(|child| match child {
        FilterNode::Group(sub) => find_group_in(sub, id),
        FilterNode::Condition(_) => None,
    })
}

fn find_condition_in<'a>(group: &'a ConditionGroup, id: &str) -> Option<&'a Condition> {
    group.children.iter().find_map(|child| match child {
        FilterNode::Condition(condition) if condition.id == id => Some(condition.as_ref()),
        FilterNode::Condition(_) => None,
        FilterNode::Group(sub) => find_condition_in(sub, id),
    })
}

/// Child indices leading from `group` to the group with `id`
fn path_to_group(group: &ConditionGroup, id: &str) -> Option<Vec<usize>> {
    if group.id == id {
        return Some(Vec::new());
    }
    group
        .children
        .iter()
        .enumerate()
        .find_map(|(index, child)| match child {
            FilterNode::Group(sub) => path_to_group(sub, id).map(|mut path| {
                path.insert(0, index);
                path
            }),
            FilterNode::Condition(_) => None,
        })
}

/// Path to the group holding the condition, plus the condition's index in it
fn locate_condition(group: &ConditionGroup, id: &str) -> Option<(Vec<usize>, usize)> {
    for (index, child) in group.children.iter().enumerate() {
        match child {
            FilterNode::Condition(condition) if condition.id == id => {
                return Some((Vec::new(), index));
            }
            FilterNode::Condition(_) => {}
            FilterNode::Group(sub) => {
                if let Some((mut path, leaf)) = locate_condition(sub, id) {
                    path.insert(0, index);
                    return Some((path, leaf));
                }
            }
        }
    }
    None
}

/// Copy the groups along `path` and apply `edit` to the last one
///
/// Children off the path keep their `Arc`s.
fn rebuild(
    group: &Arc<ConditionGroup>,
    path: &[usize],
    edit: impl FnOnce(&mut ConditionGroup),
) -> Arc<ConditionGroup> {
    let mut updated = ConditionGroup::clone(group);
    match path.split_first() {
        None => edit(&mut updated),
        Some((&index, rest)) => {
            if let Some(FilterNode::Group(child)) = group.children.get(index) {
                updated.children[index] = FilterNode::Group(rebuild(child, rest, edit));
            }
        }
    }
    Arc::new(updated)
}

fn collect_leaves(group: &ConditionGroup, path: &mut Vec<Logic>, out: &mut Vec<LogicalLeaf>) {
    let combines = group.effective_len() > 1;
    if combines {
        path.push(group.logic);
    }
    for child in &group.children {
        match child {
            FilterNode::Condition(condition) if condition.is_complete() => out.push(LogicalLeaf {
                logic_path: path.clone(),
                field: condition.field.clone(),
                operator: condition.operator.clone(),
                value: condition.value.clone(),
            }),
            FilterNode::Condition(_) => {}
            FilterNode::Group(sub) => collect_leaves(sub, path, out),
        }
    }
    if combines {
        path.pop();
    }
}
