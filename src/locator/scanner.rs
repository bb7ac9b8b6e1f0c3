//! Top-level declaration scanning of source files.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclarationKind {
    Class,
    Enum,
    Interface,
    Trait,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub simple_name: String,
    /// Empty for the root namespace.
    pub namespace: String,
    pub full_name: String,
}

impl DeclarationRecord {
    fn new(kind: DeclarationKind, simple_name: &str, namespace: &str) -> Self {
        let full_name = if namespace.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}\\{}", namespace, simple_name)
        };
        DeclarationRecord {
            kind,
            simple_name: simple_name.to_string(),
            namespace: namespace.to_string(),
            full_name,
        }
    }
}

/// Extracts declarations from source text without executing it.
pub trait DeclarationScanner: Send + Sync {
    fn scan(&self, source: &str) -> Vec<DeclarationRecord>;
}

struct Patterns {
    namespace: Regex,
    class: Regex,
    enum_: Regex,
    interface: Regex,
    trait_: Regex,
}

fn patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| Patterns {
        namespace: Regex::new(r"^namespace\s+([^\s;{]+)\s*[;{]").expect("static regex"),
        class: Regex::new(r"^(?:(?:abstract|final|readonly)\s+)*class\s+([A-Za-z_][A-Za-z0-9_]*)")
            .expect("static regex"),
        enum_: Regex::new(r"^enum\s+([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"),
        interface: Regex::new(r"^interface\s+([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"),
        trait_: Regex::new(r"^trait\s+([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"),
    })
}

/// Line scanner that tracks nesting with a raw brace count.
///
/// Only lines seen at depth 0 may declare anything. The count is byte-level:
/// braces inside string literals or comments are counted too, so such files
/// can hide or expose declarations. Swap in a tokenizing scanner if that matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BraceDepthScanner;

impl DeclarationScanner for BraceDepthScanner {
    fn scan(&self, source: &str) -> Vec<DeclarationRecord> {
        let p = patterns();
        let mut out = Vec::new();
        let mut namespace = String::new();
        let mut depth: i64 = 0;

        for line in source.lines() {
            if depth == 0 {
                if let Some(c) = p.namespace.captures(line) {
                    namespace = c[1].trim_matches('\\').to_string();
                    tracing::debug!(namespace = %namespace, "found namespace");
                }
                let kinds = [
                    (DeclarationKind::Class, &p.class),
                    (DeclarationKind::Enum, &p.enum_),
                    (DeclarationKind::Interface, &p.interface),
                    (DeclarationKind::Trait, &p.trait_),
                ];
                for (kind, re) in kinds {
                    if let Some(c) = re.captures(line) {
                        tracing::debug!(?kind, name = &c[1], "found declaration");
                        out.push(DeclarationRecord::new(kind, &c[1], &namespace));
                    }
                }
            }
            depth += line.bytes().filter(|b| *b == b'{').count() as i64;
            depth -= line.bytes().filter(|b| *b == b'}').count() as i64;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_namespace_and_kinds() {
        let src = "<?php\n\nnamespace App\\Models;\n\nabstract class Base {}\nfinal class Widget extends Base\n{\n}\nenum Color: string\n{\n    case Red = 'red';\n}\ninterface HasName {}\ntrait Named {}\n";
        let records = BraceDepthScanner.scan(src);
        let names: Vec<(DeclarationKind, &str)> =
            records.iter().map(|r| (r.kind, r.full_name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (DeclarationKind::Class, "App\\Models\\Base"),
                (DeclarationKind::Class, "App\\Models\\Widget"),
                (DeclarationKind::Enum, "App\\Models\\Color"),
                (DeclarationKind::Interface, "App\\Models\\HasName"),
                (DeclarationKind::Trait, "App\\Models\\Named"),
            ]
        );
    }

    #[test]
    fn test_nested_keyword_ignored() {
        let src = "namespace App;\nclass Outer {\nclass Inner {}\n    function f() {\ninterface Hidden {}\n    }\n}\nclass After {}\n";
        let names: Vec<String> = BraceDepthScanner.scan(src).into_iter().map(|r| r.full_name).collect();
        assert_eq!(names, vec!["App\\Outer", "App\\After"]);
    }

    #[test]
    fn test_root_namespace() {
        let records = BraceDepthScanner.scan("class Plain {}\n");
        assert_eq!(records[0].namespace, "");
        assert_eq!(records[0].full_name, "Plain");
    }
}
