//! Name derivation: REST endpoints, table names and API roots from namespace-qualified type names.

use regex::Regex;
use std::sync::OnceLock;

/// Namespace separator in qualified type names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Suffixes stripped from type names, in this order.
const TYPE_SUFFIXES: &[&str] = &["Resource", "Table", "List"];

fn word_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"))
}

/// Last segment of a qualified name. e.g. "My\Ns\Widget" -> "Widget"
pub fn simple_name(qualified: &str) -> &str {
    qualified
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(qualified)
}

/// Strip the framework's type suffixes. e.g. "AwesomeItemsTable" -> "AwesomeItems"
pub fn trim_type_suffixes(name: &str) -> &str {
    let mut out = name;
    for suffix in TYPE_SUFFIXES {
        if let Some(stripped) = out.strip_suffix(suffix) {
            out = stripped;
        }
    }
    out
}

/// Convert CamelCase to kebab-case. e.g. "MyAwesomeItems" -> "my-awesome-items"
pub fn to_kebab_case(s: &str) -> String {
    word_boundary().replace_all(s, "$1-$2").to_lowercase()
}

/// REST endpoint for a resource type. e.g. "My\Ns\AwesomeItemsResource" -> "awesome-items"
pub fn endpoint_from_name(qualified: &str) -> String {
    to_kebab_case(trim_type_suffixes(simple_name(qualified)))
}

/// Table name for a resource type. e.g. ("My\Ns\AwesomeItemsTable", "wp_") -> "wp_my_ns_awesomeitems"
pub fn table_name_from_name(qualified: &str, prefix: &str) -> String {
    let trimmed = trim_type_suffixes(qualified.trim_start_matches(NAMESPACE_SEPARATOR));
    let body = trimmed.replace(NAMESPACE_SEPARATOR, "_").to_lowercase();
    format!("{}{}", prefix, body)
}

/// Versioned API root for an API type. e.g. ("My\Shop\API", 1) -> "my/shop/v1"
pub fn api_root_from_name(qualified: &str, version: u32) -> String {
    let name = qualified.trim_start_matches(NAMESPACE_SEPARATOR);
    let name = name.strip_suffix("API").unwrap_or(name);
    let root = name.replace(NAMESPACE_SEPARATOR, "/").to_lowercase();
    format!("{}/v{}", root.trim_end_matches('/'), version)
}
