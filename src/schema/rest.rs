//! REST argument schema derived from field descriptors.

use crate::error::ConfigError;
use crate::model::{ResourceFieldDescriptor, ValueType};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RestType {
    Integer,
    String,
    Boolean,
    Float,
}

pub fn rest_type_of(field: &ResourceFieldDescriptor) -> Result<RestType, ConfigError> {
    Ok(match &field.value_type {
        ValueType::Integer => RestType::Integer,
        ValueType::String => RestType::String,
        ValueType::Boolean => RestType::Boolean,
        ValueType::Float => RestType::Float,
        ValueType::Unsupported(name) => {
            tracing::error!(field = %field.property_name, type_name = %name, "no REST type mapping");
            return Err(ConfigError::UnsupportedType {
                field: field.property_name.clone(),
                type_name: name.clone(),
            });
        }
    })
}

/// One REST argument. Serializes as `{"type": "string", "required": true}`;
/// `required` is omitted when false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RestArgDef {
    /// Argument key (the field's storage name).
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub property_name: String,
    #[serde(rename = "type")]
    pub arg_type: RestType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl RestArgDef {
    pub fn from_field(field: &ResourceFieldDescriptor) -> Result<Self, ConfigError> {
        Ok(RestArgDef {
            name: field.storage_name.clone(),
            property_name: field.property_name.clone(),
            arg_type: rest_type_of(field)?,
            required: field.is_required(),
        })
    }
}
