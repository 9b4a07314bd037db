//! Human readable preview of a query string

use serde::Serialize;

use super::decode::{ParsedQuery, parse_query, query_pairs};
use super::operator::Logic;
use super::tree::{ConditionGroup, FilterNode};

/// One filter rendered for a preview chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChip {
    pub field: String,
    pub label: String,
    pub operator: String,
    pub value: String,
    /// Logic of the enclosing group, absent when the group combines nothing
    pub logic: Option<Logic>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPreview {
    pub filters: Vec<FilterChip>,
    pub sort: Vec<String>,
    pub populate: Vec<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub summary: String,
}

/// `createdAt` -> `Created At`; relation paths are joined with ` > `
pub fn field_label(field: &str) -> String {
    field
        .split('.')
        .map(|segment| {
            let mut label = String::with_capacity(segment.len() + 4);
            for (i, c) in segment.chars().enumerate() {
                if i > 0 && c.is_uppercase() {
                    label.push(' ');
                }
                if i == 0 {
                    label.extend(c.to_uppercase());
                } else {
                    label.push(c);
                }
            }
            label
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Display symbol of an operator token; unknown tokens are shown as-is
pub fn operator_symbol(token: &str) -> &str {
    match token {
        "eq" => "=",
        "ne" => "≠",
        "lt" => "<",
        "lte" => "≤",
        "gt" => ">",
        "gte" => "≥",
        "in" => "in",
        "notIn" => "not in",
        "contains" => "contains",
        "notContains" => "not contains",
        "containsi" => "contains (case insensitive)",
        "notContainsi" => "not contains (case insensitive)",
        "startsWith" => "starts with",
        "endsWith" => "ends with",
        "null" => "is null",
        "notNull" => "is not null",
        other => other,
    }
}

fn collect_chips(group: &ConditionGroup, depth: usize, out: &mut Vec<FilterChip>) {
    let logic = (group.effective_len() > 1).then_some(group.logic);
    for child in &group.children {
        match child {
            FilterNode::Condition(condition) if condition.is_complete() => out.push(FilterChip {
                field: condition.field.clone(),
                label: field_label(&condition.field),
                operator: operator_symbol(condition.operator.as_token()).to_string(),
                value: condition.value.clone(),
                logic,
                depth,
            }),
            FilterNode::Condition(_) => {}
            FilterNode::Group(sub) => collect_chips(sub, depth + 1, out),
        }
    }
}

/// Chips of every complete leaf of a parsed query, in document order
pub fn filter_chips(parsed: &ParsedQuery) -> Vec<FilterChip> {
    let mut chips = Vec::new();
    collect_chips(parsed.tree.root(), 0, &mut chips);
    chips
}

/// Build the preview of a raw query string
pub fn describe(query: &str) -> QueryPreview {
    let parsed = parse_query(query);

    let mut sort = Vec::new();
    let mut page = None;
    let mut page_size = None;
    for (key, value) in query_pairs(query) {
        match key.as_str() {
            "sort" => sort.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string),
            ),
            "page" => page = value.parse().ok(),
            "pageSize" => page_size = value.parse().ok(),
            _ => {}
        }
    }

    let filters = filter_chips(&parsed);
    let populate: Vec<String> = parsed.populate.iter().map(|p| p.name.clone()).collect();
    let summary = summarize(&filters, &sort, &populate, page, page_size);

    QueryPreview {
        filters,
        sort,
        populate,
        page,
        page_size,
        summary,
    }
}

fn summarize(
    filters: &[FilterChip],
    sort: &[String],
    populate: &[String],
    page: Option<u32>,
    page_size: Option<u32>,
) -> String {
    let mut parts = Vec::new();

    if !filters.is_empty() {
        let texts: Vec<String> = filters
            .iter()
            .map(|chip| {
                let logic = chip.logic.map(|l| format!("{} ", l)).unwrap_or_default();
                format!("{}{} {} {}", logic, chip.label, chip.operator, chip.value)
            })
            .collect();
        parts.push(format!("Filters: {}", texts.join(", ")));
    }
    if !sort.is_empty() {
        parts.push(format!("Sort: {}", sort.join(", ")));
    }
    if !populate.is_empty() {
        parts.push(format!("Populate: {}", populate.join(", ")));
    }
    if page.is_some() || page_size.is_some() {
        parts.push(format!(
            "Page {} ({} items)",
            page.unwrap_or(1),
            page_size.unwrap_or(10)
        ));
    }

    if parts.is_empty() {
        "No filters applied".to_string()
    } else {
        parts.join(" | ")
    }
}
