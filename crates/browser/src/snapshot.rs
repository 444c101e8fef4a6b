//! Element-structure snapshots.
//!
//! The tree is extracted in page context and parsed into [`PageNode`]s here.
//! Depth is capped and text is truncated inside the script so responses stay
//! bounded regardless of page size.

use serde_json::Value;

use crate::types::PageNode;

/// JavaScript to extract a depth-bounded element tree rooted at the body.
/// Non-visual elements (script/style/noscript) are skipped; each node carries
/// its tag name and at most 100 characters of text content.
pub const EXTRACT_TREE_JS: &str = r#"
(() => {
    const getElements = (el, depth) => {
        if (depth > 3) return [];
        const result = [];
        for (const child of el.children) {
            const tag = child.tagName.toLowerCase();
            if (tag === 'script' || tag === 'style' || tag === 'noscript') continue;
            result.push({
                tag,
                text: (child.textContent || '').slice(0, 100),
                children: getElements(child, depth + 1)
            });
        }
        return result;
    };
    return document.body ? getElements(document.body, 0) : [];
})()
"#;

/// Parse the script result into nodes. Anything that is not the expected
/// array shape becomes an empty tree rather than an error.
pub fn parse_nodes(value: &Value) -> Vec<PageNode> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_nodes() {
        let value = serde_json::json!([
            {
                "tag": "div",
                "text": "Outer",
                "children": [
                    { "tag": "p", "text": "Inner", "children": [] }
                ]
            },
            { "tag": "footer", "text": "", "children": [] }
        ]);

        let nodes = parse_nodes(&value);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].tag, "div");
        assert_eq!(nodes[0].children.len(), 1);
        assert_eq!(nodes[0].children[0].text, "Inner");
        assert!(nodes[1].children.is_empty());
    }

    #[test]
    fn parse_tolerates_missing_fields() {
        let value = serde_json::json!([{ "tag": "span" }]);
        let nodes = parse_nodes(&value);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "");
        assert!(nodes[0].children.is_empty());
    }

    #[test]
    fn parse_non_array_is_empty() {
        assert!(parse_nodes(&Value::Null).is_empty());
        assert!(parse_nodes(&serde_json::json!({"tag": "div"})).is_empty());
    }
}
