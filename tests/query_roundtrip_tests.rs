//! Round-trip tests for the query string engine
//!
//! These tests verify that:
//! - Trees survive encode then decode as the same set of logical leaves
//! - Single leaves are written without a logic wrapper
//! - Populate, sort and unknown operators pass through unchanged
//! - Array indices are ordered numerically

use magic_mark::query::{
    Condition, ConditionGroup, ConditionKey, ConditionTree, FilterNode, Logic, Operator,
    MAX_FILTER_DEPTH, PopulateField, ROOT_ID, SortDirection, SortSpec, describe, parse_query, parse_tree,
    to_query_string,
};

fn leaf(id: &str, field: &str, op: Operator, value: &str) -> FilterNode {
    FilterNode::condition(Condition::new(id, field, op, value))
}

fn group(id: &str, logic: Logic, children: Vec<FilterNode>) -> FilterNode {
    FilterNode::group(ConditionGroup::new(id, logic, children))
}

fn tree(logic: Logic, children: Vec<FilterNode>) -> ConditionTree {
    ConditionTree::from_root(ConditionGroup::new(ROOT_ID, logic, children)).unwrap()
}

fn encode(tree: &ConditionTree) -> String {
    to_query_string(tree, None, &[])
}

// =============================================================================
// Logical equivalence
// =============================================================================

mod logical_equivalence_tests {
    use super::*;

    fn assert_round_trip(original: &ConditionTree) {
        let decoded = parse_tree(&encode(original));
        assert_eq!(decoded.logical_leaves(), original.logical_leaves());
    }

    #[test]
    fn test_flat_and() {
        assert_round_trip(&tree(
            Logic::And,
            vec![
                leaf("a", "status", Operator::Eq, "published"),
                leaf("b", "views", Operator::Gte, "100"),
            ],
        ));
    }

    #[test]
    fn test_flat_or() {
        assert_round_trip(&tree(
            Logic::Or,
            vec![
                leaf("a", "title", Operator::Contains, "rust"),
                leaf("b", "title", Operator::Contains, "tokio"),
                leaf("c", "title", Operator::StartsWith, "async"),
            ],
        ));
    }

    #[test]
    fn test_nested_groups() {
        assert_round_trip(&tree(
            Logic::And,
            vec![
                leaf("a", "status", Operator::Eq, "published"),
                group(
                    "g1",
                    Logic::Or,
                    vec![
                        leaf("b", "email", Operator::Contains, "acme"),
                        leaf("c", "email", Operator::Contains, "example"),
                    ],
                ),
            ],
        ));
    }

    #[test]
    fn test_three_levels_deep() {
        assert_round_trip(&tree(
            Logic::Or,
            vec![
                leaf("a", "locale", Operator::Eq, "en"),
                group(
                    "g1",
                    Logic::And,
                    vec![
                        leaf("b", "views", Operator::Gt, "10"),
                        group(
                            "g2",
                            Logic::Or,
                            vec![
                                leaf("c", "tag", Operator::Eq, "news"),
                                leaf("d", "tag", Operator::Eq, "blog"),
                            ],
                        ),
                    ],
                ),
            ],
        ));
    }

    #[test]
    fn test_single_leaf_subgroup_unwraps_without_changing_meaning() {
        let original = tree(
            Logic::Or,
            vec![
                leaf("a", "status", Operator::Eq, "draft"),
                group(
                    "g1",
                    Logic::And,
                    vec![leaf("b", "status", Operator::Eq, "review")],
                ),
            ],
        );
        assert_eq!(
            encode(&original),
            "filters[$or][0][status][$eq]=draft&filters[$or][1][status][$eq]=review"
        );
        assert_round_trip(&original);
    }

    #[test]
    fn test_relation_path_and_special_characters() {
        assert_round_trip(&tree(
            Logic::And,
            vec![
                leaf("a", "author.email", Operator::Eq, "eddie@example.com"),
                leaf("b", "title", Operator::Contains, "50% & more = fun?"),
                leaf("c", "summary", Operator::Contains, "héllo wörld"),
            ],
        ));
    }

    #[test]
    fn test_built_through_tree_edits() {
        let edited = ConditionTree::new()
            .update_condition("condition_1", ConditionKey::Field, "status")
            .update_condition("condition_1", ConditionKey::Value, "published")
            .add_group(ROOT_ID)
            .toggle_group_logic(ROOT_ID);
        let group_id = edited.root().children[1].id().to_string();
        let FilterNode::Group(nested) = &edited.root().children[1] else {
            panic!("expected nested group");
        };
        let nested_leaf = nested.children[0].id().to_string();
        let edited = edited
            .update_condition(&nested_leaf, ConditionKey::Field, "views")
            .update_condition(&nested_leaf, ConditionKey::Operator, "$lt")
            .update_condition(&nested_leaf, ConditionKey::Value, "5")
            .add_condition(&group_id);

        // the second nested leaf is still a draft and drops out
        assert_eq!(edited.logical_leaves().len(), 2);
        assert_round_trip(&edited);
    }
}

// =============================================================================
// Encoding shape
// =============================================================================

mod encoding_shape_tests {
    use super::*;

    #[test]
    fn test_single_leaf_is_unwrapped() {
        let t = tree(Logic::And, vec![leaf("a", "status", Operator::Eq, "value")]);
        assert_eq!(encode(&t), "filters[status][$eq]=value");
    }

    #[test]
    fn test_blank_field_produces_no_filters() {
        let t = ConditionTree::new().update_condition("condition_1", ConditionKey::Value, "x");
        let query = to_query_string(&t, None, &[PopulateField::shallow("author")]);
        assert!(!query.contains("filters["));
        assert_eq!(query, "populate[author]=true");
    }

    #[test]
    fn test_empty_tree_is_empty_string() {
        assert_eq!(to_query_string(&ConditionTree::new(), None, &[]), "");
    }

    #[test]
    fn test_deep_populate_takes_precedence() {
        let query = to_query_string(
            &ConditionTree::new(),
            None,
            &[PopulateField::new("comments", true, true)],
        );
        assert_eq!(query, "populate[comments][populate]=%2A");
    }

    #[test]
    fn test_output_order_is_filters_populate_sort() {
        let t = tree(Logic::And, vec![leaf("a", "status", Operator::Eq, "published")]);
        let query = to_query_string(
            &t,
            Some(&SortSpec::new("createdAt", SortDirection::Desc)),
            &[PopulateField::shallow("author")],
        );
        assert_eq!(
            query,
            "filters[status][$eq]=published&populate[author]=true&sort=createdAt:DESC"
        );
    }
}

// =============================================================================
// Decoding
// =============================================================================

mod decoding_tests {
    use super::*;

    #[test]
    fn test_sort_round_trip() {
        let parsed = parse_query("sort=updatedAt:DESC");
        assert_eq!(
            parsed.sort,
            Some(SortSpec::new("updatedAt", SortDirection::Desc))
        );
        let again = to_query_string(&parsed.tree, parsed.sort.as_ref(), &parsed.populate);
        assert_eq!(again, "sort=updatedAt:DESC");
    }

    #[test]
    fn test_numeric_index_ordering() {
        let parsed = parse_query(
            "filters[$and][10][title][$eq]=ten&filters[$and][2][title][$eq]=two&filters[$and][1][title][$eq]=one",
        );
        let values: Vec<_> = parsed
            .tree
            .logical_leaves()
            .into_iter()
            .map(|leaf| leaf.value)
            .collect();
        assert_eq!(values, vec!["one", "two", "ten"]);
    }

    #[test]
    fn test_mixed_nested_logic() {
        let query = "filters[$and][0][a][$eq]=1&filters[$and][1][$or][0][b][$eq]=2&filters[$and][1][$or][1][b][$eq]=3";
        let parsed = parse_tree(query);

        let root = parsed.root();
        assert_eq!(root.logic, Logic::And);
        assert_eq!(root.children.len(), 2);
        let FilterNode::Condition(first) = &root.children[0] else {
            panic!("expected leaf a=1");
        };
        assert_eq!((first.field.as_str(), first.value.as_str()), ("a", "1"));
        let FilterNode::Group(nested) = &root.children[1] else {
            panic!("expected nested OR group");
        };
        assert_eq!(nested.logic, Logic::Or);
        assert_eq!(nested.children.len(), 2);

        let reencoded = encode(&parsed);
        assert_eq!(parse_tree(&reencoded).logical_leaves(), parsed.logical_leaves());
        assert_eq!(reencoded, query);
    }

    #[test]
    fn test_unknown_operator_passthrough() {
        let t = tree(
            Logic::And,
            vec![leaf("a", "score", Operator::from_token("customOp"), "7")],
        );
        let query = encode(&t);
        assert_eq!(query, "filters[score][$customOp]=7");

        let decoded = parse_tree(&query);
        let leaves = decoded.logical_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].operator.as_token(), "customOp");
    }

    #[test]
    fn test_custom_operator_spelled_like_logic_passthrough() {
        let t = ConditionTree::new()
            .update_condition("condition_1", ConditionKey::Field, "x")
            .update_condition("condition_1", ConditionKey::Operator, "$or")
            .update_condition("condition_1", ConditionKey::Value, "1");
        let query = encode(&t);
        assert_eq!(query, "filters[x][$or]=1");

        let leaves = parse_tree(&query).logical_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].field, "x");
        assert_eq!(leaves[0].operator, Operator::Custom("or".to_string()));
        assert_eq!(leaves[0].value, "1");

        let leaves = parse_tree("filters[$and][0][y][$and]=2").logical_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].operator.as_token(), "and");
    }

    #[test]
    fn test_malformed_keys_are_dropped() {
        let parsed = parse_query(
            "filters[$and][x][a][$eq]=1&filters[$and][0][b]=2&filters[$and][1][c][$eq]=3&sort=broken",
        );
        let fields: Vec<_> = parsed
            .tree
            .logical_leaves()
            .into_iter()
            .map(|leaf| leaf.field)
            .collect();
        assert_eq!(fields, vec!["c"]);
        assert!(parsed.sort.is_none());
    }

    #[test]
    fn test_very_deep_key_is_dropped() {
        let deep = format!("filters{}[a][$eq]=1", "[$and][0]".repeat(10_000));
        let parsed = parse_query(&format!("{}&filters[$and][0][b][$eq]=2", deep));
        let fields: Vec<_> = parsed
            .tree
            .logical_leaves()
            .into_iter()
            .map(|leaf| leaf.field)
            .collect();
        assert_eq!(fields, vec!["b"]);
    }

    #[test]
    fn test_depth_limit_boundary() {
        let at_limit = format!("filters{}[a][$eq]=1", "[$or][0]".repeat(MAX_FILTER_DEPTH));
        let leaves = parse_tree(&at_limit).logical_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].field, "a");

        let over = format!("filters{}[a][$eq]=1", "[$or][0]".repeat(MAX_FILTER_DEPTH + 1));
        assert!(!parse_tree(&over).has_filters());
    }

    #[test]
    fn test_non_canonical_indices_are_dropped() {
        let parsed = parse_query(
            "filters[$and][1][a][$eq]=one&filters[$and][01][b][$eq]=zero-one&filters[$and][99999999999999999999999][c][$eq]=huge",
        );
        let leaves = parsed.tree.logical_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].field, "a");
        assert_eq!(leaves[0].value, "one");
    }

    #[test]
    fn test_numeric_field_segment_is_dropped() {
        assert!(!parse_tree("filters[$and][0][01][$eq]=1").has_filters());
    }

    #[test]
    fn test_deep_populate_round_trip() {
        let parsed = parse_query("populate[author]=true&populate[comments][populate]=%2A");
        assert_eq!(
            to_query_string(&parsed.tree, None, &parsed.populate),
            "populate[author]=true&populate[comments][populate]=%2A"
        );
    }
}

// =============================================================================
// Preview
// =============================================================================

mod preview_tests {
    use super::*;

    #[test]
    fn test_preview_of_mixed_query() {
        let preview = describe(
            "filters[$and][0][createdAt][$gte]=2024-01-01&filters[$and][1][author.email][$customOp]=x&sort=title:ASC&populate[author]=true",
        );
        assert_eq!(preview.filters.len(), 2);
        assert_eq!(preview.filters[0].label, "Created At");
        assert_eq!(preview.filters[1].operator, "customOp");
        assert_eq!(preview.sort, vec!["title:ASC".to_string()]);
        assert_eq!(preview.populate, vec!["author".to_string()]);
    }

    #[test]
    fn test_preview_of_empty_query() {
        let preview = describe("");
        assert!(preview.filters.is_empty());
        assert_eq!(preview.summary, "No filters applied");
    }
}
