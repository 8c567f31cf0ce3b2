//! Encoding of listing/view options into query-string parameters.

use daybed_core::ListOptions;

use crate::Result;

/// Convert options into query pairs. The server's query parser expects
/// JSON literals for the structured key fields (`key`, `keys`,
/// `start_key`, `end_key`), so those are JSON-encoded into a single
/// value each; plain scalars pass through as-is. Every listing and view
/// request in the crate goes through this one routine.
pub(crate) fn to_query_pairs(options: &ListOptions) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    if let Some(limit) = options.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(key) = &options.key {
        pairs.push(("key".to_string(), serde_json::to_string(key)?));
    }
    if let Some(keys) = &options.keys {
        pairs.push(("keys".to_string(), serde_json::to_string(keys)?));
    }
    if let Some(start_key) = &options.start_key {
        pairs.push(("start_key".to_string(), serde_json::to_string(start_key)?));
    }
    if let Some(end_key) = &options.end_key {
        pairs.push(("end_key".to_string(), serde_json::to_string(end_key)?));
    }
    if let Some(inclusive_end) = options.inclusive_end {
        pairs.push(("inclusive_end".to_string(), inclusive_end.to_string()));
    }
    if let Some(descending) = options.descending {
        pairs.push(("descending".to_string(), descending.to_string()));
    }
    if let Some(skip) = options.skip {
        pairs.push(("skip".to_string(), skip.to_string()));
    }
    if let Some(reduce) = options.reduce {
        pairs.push(("reduce".to_string(), reduce.to_string()));
    }
    if let Some(group) = options.group {
        pairs.push(("group".to_string(), group.to_string()));
    }
    if let Some(group_level) = options.group_level {
        pairs.push(("group_level".to_string(), group_level.to_string()));
    }
    if let Some(include_docs) = options.include_docs {
        pairs.push(("include_docs".to_string(), include_docs.to_string()));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value_of<'a>(pairs: &'a [(String, String)], name: &str) -> &'a str {
        &pairs
            .iter()
            .find(|(key, _)| key == name)
            .unwrap_or_else(|| panic!("missing {} param", name))
            .1
    }

    #[test]
    fn test_empty_options_encode_to_nothing() {
        assert!(to_query_pairs(&ListOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_composite_start_key_is_one_json_value() {
        let options = ListOptions {
            start_key: Some(json!(["part", 15])),
            ..Default::default()
        };
        let pairs = to_query_pairs(&options).unwrap();
        // One parameter holding a JSON literal, not two separate params
        assert_eq!(pairs.len(), 1);
        assert_eq!(value_of(&pairs, "start_key"), r#"["part",15]"#);
    }

    #[test]
    fn test_string_keys_are_json_quoted() {
        let options = ListOptions {
            key: Some(json!("smith")),
            end_key: Some(json!({"dept": "tools"})),
            ..Default::default()
        };
        let pairs = to_query_pairs(&options).unwrap();
        assert_eq!(value_of(&pairs, "key"), r#""smith""#);
        assert_eq!(value_of(&pairs, "end_key"), r#"{"dept":"tools"}"#);
    }

    #[test]
    fn test_keys_list_encodes_as_json_array() {
        let options = ListOptions {
            keys: Some(vec![json!("a"), json!(["b", 2])]),
            ..Default::default()
        };
        let pairs = to_query_pairs(&options).unwrap();
        assert_eq!(value_of(&pairs, "keys"), r#"["a",["b",2]]"#);
    }

    #[test]
    fn test_scalars_pass_through_unquoted() {
        let options = ListOptions {
            limit: Some(25),
            skip: Some(5),
            descending: Some(true),
            group_level: Some(2),
            include_docs: Some(false),
            ..Default::default()
        };
        let pairs = to_query_pairs(&options).unwrap();
        assert_eq!(value_of(&pairs, "limit"), "25");
        assert_eq!(value_of(&pairs, "skip"), "5");
        assert_eq!(value_of(&pairs, "descending"), "true");
        assert_eq!(value_of(&pairs, "group_level"), "2");
        assert_eq!(value_of(&pairs, "include_docs"), "false");
    }
}
