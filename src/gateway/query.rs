//! Query rewriting for schema viewers that send `?format=` instead of the configured override key.

use url::form_urlencoded;

/// Parameter name schema viewers send.
pub const FORMAT_PARAM: &str = "format";

/// Copy the last `format` value into `alias`, replacing any existing `alias` values.
/// `format` itself stays. Returns `None` when nothing changes.
pub fn alias_format_param(query: &str, alias: &str) -> Option<String> {
    if alias == FORMAT_PARAM {
        return None;
    }
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
    let value = pairs.iter().rev().find(|(k, _)| k == FORMAT_PARAM)?.1.clone();

    let mut out = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs.iter().filter(|(k, _)| k != alias) {
        out.append_pair(k, v);
    }
    out.append_pair(alias, &value);
    Some(out.finish())
}

/// Decoded query pairs in request order.
pub fn query_pairs(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_format_into_alias() {
        assert_eq!(
            alias_format_param("format=openapi", "scheme").as_deref(),
            Some("format=openapi&scheme=openapi")
        );
    }

    #[test]
    fn keeps_other_params_and_replaces_existing_alias() {
        let rewritten = alias_format_param("scheme=yaml&x=1&format=openapi", "scheme").unwrap();
        assert_eq!(
            query_pairs(Some(&rewritten)),
            vec![
                ("x".to_string(), "1".to_string()),
                ("format".to_string(), "openapi".to_string()),
                ("scheme".to_string(), "openapi".to_string()),
            ]
        );
    }

    #[test]
    fn last_format_value_wins() {
        let rewritten = alias_format_param("format=json&format=yaml", "scheme").unwrap();
        assert!(rewritten.ends_with("scheme=yaml"));
    }

    #[test]
    fn no_format_means_no_rewrite() {
        assert_eq!(alias_format_param("x=1", "scheme"), None);
        assert_eq!(alias_format_param("", "scheme"), None);
    }

    #[test]
    fn alias_named_format_is_a_no_op() {
        assert_eq!(alias_format_param("format=openapi", "format"), None);
    }
}
