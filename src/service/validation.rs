//! Request validation against derived REST arguments.

use crate::error::AppError;
use crate::model::RawRow;
use crate::schema::RestArgDef;
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// Every required argument must be present and non-null.
    pub fn validate(body: &RawRow, args: &[&RestArgDef]) -> Result<(), AppError> {
        for arg in args.iter().filter(|a| a.required) {
            match body.get(&arg.name) {
                None | Some(Value::Null) => {
                    return Err(AppError::Validation(format!("{} is required", arg.name)));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Validate only the arguments present in body (for edits). A required argument may be
    /// omitted but not cleared.
    pub fn validate_partial(body: &RawRow, args: &[&RestArgDef]) -> Result<(), AppError> {
        for arg in args.iter().filter(|a| a.required) {
            if let Some(Value::Null) = body.get(&arg.name) {
                return Err(AppError::Validation(format!("{} cannot be null", arg.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RestType;
    use serde_json::json;

    fn arg(name: &str, required: bool) -> RestArgDef {
        RestArgDef {
            name: name.into(),
            property_name: name.into(),
            arg_type: RestType::String,
            required,
        }
    }

    #[test]
    fn test_required_missing() {
        let value = arg("value", true);
        let note = arg("note", false);
        let args = vec![&value, &note];
        let body = json!({"note": "x"}).as_object().cloned().unwrap();
        assert!(matches!(
            RequestValidator::validate(&body, &args),
            Err(AppError::Validation(_))
        ));
        assert!(RequestValidator::validate_partial(&body, &args).is_ok());

        let cleared = json!({"value": null}).as_object().cloned().unwrap();
        assert!(RequestValidator::validate_partial(&cleared, &args).is_err());
    }
}
