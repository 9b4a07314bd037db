//! Bracket-encoded query string back to a condition tree
//!
//! Filter keys go through two small stages:
//!
//! 1. [`tokenize_filter_key`] turns `filters[$and][1][$or][0][email][$contains]`
//!    into `["$and", "1", "$or", "0", "email", "$contains"]`.
//! 2. [`classify`] reads the tokens with the grammar
//!    `expr := LOGIC INDEX expr | FIELD+ OPERATOR` and yields a [`Fragment`].
//!
//! Fragments are merged into an index-keyed accumulator, so the keys of one
//! group can arrive in any order. Anything that does not fit the grammar is
//! dropped; parsing never fails.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use super::directives::{PopulateField, SortSpec};
use super::operator::{Logic, Operator};
use super::tree::{Condition, ConditionGroup, ConditionTree, FilterNode, ROOT_ID};

/// The three independent results of parsing a query string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub tree: ConditionTree,
    pub sort: Option<SortSpec>,
    pub populate: Vec<PopulateField>,
}

/// Shape of a single `filters[...]` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Leaf {
        field: String,
        operator: Operator,
    },
    Nested {
        logic: Logic,
        index: usize,
        inner: Box<Fragment>,
    },
}

/// Split a query string into decoded `(key, value)` pairs
///
/// A leading `?` is ignored, `+` decodes to a space and a key without `=`
/// gets an empty value.
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}

/// Deepest `[$and|$or][N]` nesting a single filter key may carry
pub const MAX_FILTER_DEPTH: usize = 32;

/// Bracket tokens of a `filters[...]` key
///
/// Returns `None` for keys that are not filter keys, hold empty or stray
/// bracket segments, or nest more than [`MAX_FILTER_DEPTH`] logic levels.
pub fn tokenize_filter_key(key: &str) -> Option<Vec<&str>> {
    let inner = key.strip_prefix("filters[")?.strip_suffix(']')?;
    let tokens: Vec<&str> = inner.split("][").collect();
    if tokens
        .iter()
        .any(|token| token.is_empty() || token.contains(['[', ']']))
    {
        return None;
    }
    let depth = tokens
        .iter()
        .filter(|token| Logic::from_token(token).is_some())
        .count();
    if depth > MAX_FILTER_DEPTH {
        return None;
    }
    Some(tokens)
}

/// Classify filter tokens
///
/// Keys nested deeper than [`MAX_FILTER_DEPTH`] are rejected.
pub fn classify(tokens: &[&str]) -> Option<Fragment> {
    let mut path = Vec::new();
    let mut rest = tokens;

    while let Some(logic) = rest.first().and_then(|token| Logic::from_token(token)) {
        if path.len() == MAX_FILTER_DEPTH {
            return None;
        }
        let (index, tail) = rest[1..].split_first()?;
        path.push((logic, parse_index(index)?));
        rest = tail;
    }

    // After at least one field the last token can only be an operator, even
    // a custom one spelled like a logic token.
    let (operator, fields) = rest.split_last()?;
    let is_operator = operator.len() > 1 && operator.starts_with('$');
    if fields.is_empty() || !is_operator {
        return None;
    }
    if fields
        .iter()
        .any(|field| field.starts_with('$') || is_numeric(field))
    {
        return None;
    }

    let leaf = Fragment::Leaf {
        field: fields.join("."),
        operator: Operator::from_token(operator),
    };
    Some(
        path.into_iter()
            .rev()
            .fold(leaf, |inner, (logic, index)| Fragment::Nested {
                logic,
                index,
                inner: Box::new(inner),
            }),
    )
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Array index in canonical form; `01` or an overflowing number is not one
fn parse_index(token: &str) -> Option<usize> {
    if !is_numeric(token) || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    token.parse().ok()
}

#[derive(Debug, Clone)]
struct LeafSlot {
    field: String,
    operator: Operator,
    value: String,
}

/// One array position; several leaves at a position form an implicit AND
#[derive(Debug)]
enum Slot {
    Leaves(Vec<LeafSlot>),
    Group {
        logic: Logic,
        items: BTreeMap<usize, Slot>,
    },
}

impl Slot {
    fn absorb_leaf(&mut self, leaf: LeafSlot) -> bool {
        match self {
            Slot::Leaves(leaves) => {
                match leaves
                    .iter_mut()
                    .find(|l| l.field == leaf.field && l.operator == leaf.operator)
                {
                    Some(existing) => existing.value = leaf.value,
                    None => leaves.push(leaf),
                }
                true
            }
            Slot::Group { .. } => false,
        }
    }
}

/// Insert a fragment below `index`, returning false on a shape conflict
fn insert(items: &mut BTreeMap<usize, Slot>, index: usize, fragment: Fragment, value: String) -> bool {
    match fragment {
        Fragment::Leaf { field, operator } => {
            let leaf = LeafSlot {
                field,
                operator,
                value,
            };
            match items.entry(index) {
                Entry::Vacant(entry) => {
                    entry.insert(Slot::Leaves(vec![leaf]));
                    true
                }
                Entry::Occupied(mut entry) => entry.get_mut().absorb_leaf(leaf),
            }
        }
        Fragment::Nested {
            logic,
            index: inner_index,
            inner,
        } => match items.entry(index).or_insert_with(|| Slot::Group {
            logic,
            items: BTreeMap::new(),
        }) {
            Slot::Group {
                logic: existing,
                items,
            } if *existing == logic => insert(items, inner_index, *inner, value),
            _ => false,
        },
    }
}

#[derive(Default)]
struct Accumulator {
    logic: Option<Logic>,
    items: BTreeMap<usize, Slot>,
    bare: Vec<LeafSlot>,
}

impl Accumulator {
    fn absorb(&mut self, key: &str, fragment: Fragment, value: String) {
        match fragment {
            Fragment::Leaf { field, operator } => self.bare.push(LeafSlot {
                field,
                operator,
                value,
            }),
            Fragment::Nested {
                logic,
                index,
                inner,
            } => {
                let root_logic = *self.logic.get_or_insert(logic);
                if root_logic != logic {
                    tracing::debug!(key, "filter key under a second root logic dropped");
                    return;
                }
                if !insert(&mut self.items, index, *inner, value) {
                    tracing::debug!(key, "conflicting filter key dropped");
                }
            }
        }
    }

    fn into_tree(self) -> ConditionTree {
        let mut ids = IdAllocator::default();

        let indexed: Vec<FilterNode> = self
            .items
            .into_values()
            .map(|slot| slot_node(slot, &mut ids))
            .collect();
        let bare: Vec<FilterNode> = self
            .bare
            .into_iter()
            .map(|leaf| leaf_node(leaf, &mut ids))
            .collect();

        let (logic, mut children) = match self.logic {
            None => (Logic::And, bare),
            Some(Logic::And) => (Logic::And, indexed.into_iter().chain(bare).collect()),
            Some(Logic::Or) if bare.is_empty() => (Logic::Or, indexed),
            Some(Logic::Or) => {
                let group = ConditionGroup::new(ids.next("group"), Logic::Or, indexed);
                let mut children = bare;
                children.push(FilterNode::group(group));
                (Logic::And, children)
            }
        };

        if children.is_empty() {
            children.push(FilterNode::condition(Condition::blank(ids.next("condition"))));
        }

        ConditionTree::from_parts(ConditionGroup::new(ROOT_ID, logic, children), ids.counter)
    }
}

struct IdAllocator {
    counter: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl IdAllocator {
    fn next(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        id
    }
}

fn leaf_node(leaf: LeafSlot, ids: &mut IdAllocator) -> FilterNode {
    FilterNode::condition(Condition::new(
        ids.next("condition"),
        leaf.field,
        leaf.operator,
        leaf.value,
    ))
}

fn slot_node(slot: Slot, ids: &mut IdAllocator) -> FilterNode {
    match slot {
        Slot::Leaves(mut leaves) if leaves.len() == 1 => leaf_node(leaves.remove(0), ids),
        Slot::Leaves(leaves) => {
            let id = ids.next("group");
            let children = leaves.into_iter().map(|leaf| leaf_node(leaf, ids)).collect();
            FilterNode::group(ConditionGroup::new(id, Logic::And, children))
        }
        Slot::Group { logic, items } => {
            let id = ids.next("group");
            let children = items
                .into_values()
                .map(|slot| slot_node(slot, ids))
                .collect();
            FilterNode::group(ConditionGroup::new(id, logic, children))
        }
    }
}

/// Relation name of a `populate[...]` key and whether it asks for a nested populate
fn populate_key(key: &str) -> Option<(&str, bool)> {
    let inner = key.strip_prefix("populate[")?;
    let (name, rest) = inner.split_once(']')?;
    if name.is_empty() {
        return None;
    }
    Some((name, rest.starts_with("[populate]")))
}

fn merge_populate(fields: &mut Vec<PopulateField>, name: &str, deep: bool) {
    match fields.iter_mut().find(|field| field.name == name) {
        Some(field) => {
            field.enabled = true;
            field.deep |= deep;
        }
        None => fields.push(PopulateField::new(name, true, deep)),
    }
}

/// Recover the condition tree, sort and populate directives of a query string
pub fn parse_query(query: &str) -> ParsedQuery {
    let mut accumulator = Accumulator::default();
    let mut sort = None;
    let mut populate = Vec::new();

    for (key, value) in query_pairs(query) {
        if key.starts_with("filters[") {
            match tokenize_filter_key(&key).and_then(|tokens| classify(&tokens)) {
                Some(fragment) => accumulator.absorb(&key, fragment, value),
                None => tracing::debug!(key = %key, "unsupported filter key dropped"),
            }
        } else if key.starts_with("populate[") {
            match populate_key(&key) {
                // `populate[0]=author` array form
                Some((name, _)) if parse_index(name).is_some() => {
                    if !value.is_empty() && value != "*" {
                        merge_populate(&mut populate, &value, false);
                    }
                }
                Some((name, nested)) => merge_populate(&mut populate, name, nested || value == "*"),
                None => tracing::debug!(key = %key, "unsupported populate key dropped"),
            }
        } else if key == "sort" && sort.is_none() {
            sort = SortSpec::parse(&value);
            if sort.is_none() {
                tracing::debug!(value = %value, "malformed sort token ignored");
            }
        }
    }

    ParsedQuery {
        tree: accumulator.into_tree(),
        sort,
        populate,
    }
}

/// Convenience over [`parse_query`] when only the tree is needed
pub fn parse_tree(query: &str) -> ConditionTree {
    parse_query(query).tree
}
