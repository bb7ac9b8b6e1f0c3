//! Resource field descriptors and their declared value types.

use crate::error::ConfigError;
use crate::model::FieldAttribute;
use std::fmt;

/// Declared primitive type of a field. Unknown declarations are kept so that
/// derivation can reject them with the offending name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueType {
    Integer,
    String,
    Boolean,
    Float,
    Unsupported(String),
}

impl ValueType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => ValueType::Integer,
            "string" | "str" => ValueType::String,
            "bool" | "boolean" => ValueType::Boolean,
            "float" | "double" => ValueType::Float,
            _ => ValueType::Unsupported(s.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueType::Integer => "integer",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Float => "float",
            ValueType::Unsupported(s) => s,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceFieldDescriptor {
    pub property_name: String,
    /// Column and REST argument name. Equals `property_name` unless aliased.
    pub storage_name: String,
    pub value_type: ValueType,
    pub attributes: Vec<FieldAttribute>,
}

impl ResourceFieldDescriptor {
    pub fn new(
        property_name: impl Into<String>,
        value_type: ValueType,
        attributes: Vec<FieldAttribute>,
    ) -> Self {
        let property_name = property_name.into();
        let storage_name = attributes
            .iter()
            .find_map(|a| match a {
                FieldAttribute::FieldAlias(alias) if !alias.is_empty() => Some(alias.clone()),
                _ => None,
            })
            .unwrap_or_else(|| property_name.clone());
        ResourceFieldDescriptor {
            property_name,
            storage_name,
            value_type,
            attributes,
        }
    }

    pub fn is_required(&self) -> bool {
        self.attributes.iter().any(FieldAttribute::is_required)
    }

    /// Declared string length, if any.
    pub fn length(&self) -> Option<u32> {
        self.attributes.iter().find_map(|a| match a {
            FieldAttribute::Length(n) => Some(*n),
            _ => None,
        })
    }

    /// Rejects attribute sets that cannot be applied together.
    pub fn check_conflicts(&self) -> Result<(), ConfigError> {
        let lengths = self
            .attributes
            .iter()
            .filter(|a| matches!(a, FieldAttribute::Length(_)))
            .count();
        let aliases = self
            .attributes
            .iter()
            .filter(|a| matches!(a, FieldAttribute::FieldAlias(_)))
            .count();
        if lengths > 1 {
            return Err(ConfigError::ConflictingAttributes {
                field: self.property_name.clone(),
                detail: "more than one length".into(),
            });
        }
        if aliases > 1 {
            return Err(ConfigError::ConflictingAttributes {
                field: self.property_name.clone(),
                detail: "more than one alias".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_overrides_storage_name() {
        let f = ResourceFieldDescriptor::new(
            "display_name",
            ValueType::String,
            vec![FieldAttribute::FieldAlias("name".into())],
        );
        assert_eq!(f.property_name, "display_name");
        assert_eq!(f.storage_name, "name");

        let plain = ResourceFieldDescriptor::new("label", ValueType::String, vec![]);
        assert_eq!(plain.storage_name, "label");
    }

    #[test]
    fn test_value_type_parse() {
        assert_eq!(ValueType::parse("int"), ValueType::Integer);
        assert_eq!(ValueType::parse("Boolean"), ValueType::Boolean);
        assert_eq!(ValueType::parse("array"), ValueType::Unsupported("array".into()));
    }

    #[test]
    fn test_conflicting_lengths() {
        let f = ResourceFieldDescriptor::new(
            "code",
            ValueType::String,
            vec![FieldAttribute::Length(8), FieldAttribute::Length(16)],
        );
        assert!(matches!(
            f.check_conflicts(),
            Err(ConfigError::ConflictingAttributes { .. })
        ));
    }
}
