//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns a domain `invalid_request` error whose `details`
//! name the offending field and a stable machine-readable code.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{Error, ListItemId, ListType, ShortId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyValue,
    InvalidUuid,
    InvalidShortId,
    InvalidListType,
    InvalidTimestamp,
    InvalidNumber,
    DuplicateId,
    TooLong,
    EmptyUpdate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyValue => "empty_value",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidShortId => "invalid_short_id",
            ErrorCode::InvalidListType => "invalid_list_type",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::DuplicateId => "duplicate_id",
            ErrorCode::TooLong => "too_long",
            ErrorCode::EmptyUpdate => "empty_update",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

fn index_error(
    field: FieldName,
    code: ErrorCode,
    message: String,
    index: usize,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "index": index,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

/// Require a present, non-blank string and return it trimmed.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    non_blank(value, field)
}

/// Reject a blank string, returning it trimmed otherwise.
pub(crate) fn non_blank(value: String, field: FieldName) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let name = field.as_str();
        return Err(field_error(
            field,
            ErrorCode::EmptyValue,
            format!("{name} must not be empty"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Reject strings longer than `max` characters.
pub(crate) fn bounded(value: String, max: usize, field: FieldName) -> Result<String, Error> {
    if value.chars().count() > max {
        let name = field.as_str();
        return Err(field_error(
            field,
            ErrorCode::TooLong,
            format!("{name} must be at most {max} characters"),
        ));
    }
    Ok(value)
}

/// Reject a patch body that changes nothing.
pub(crate) fn empty_update_error() -> Error {
    Error::invalid_request("request must change at least one field")
        .with_details(json!({ "code": ErrorCode::EmptyUpdate.as_str() }))
}

/// Validate an optional string that, when present, must not be blank.
pub(crate) fn optional_non_blank(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<String>, Error> {
    value.map(|value| non_blank(value, field)).transpose()
}

pub(crate) fn parse_short_id(value: &str, field: FieldName) -> Result<ShortId, Error> {
    let name = field.as_str();
    ShortId::new(value).map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidShortId,
            format!("{name} must be eight hexadecimal characters"),
            value,
        )
    })
}

pub(crate) fn parse_item_id(value: &str, field: FieldName) -> Result<ListItemId, Error> {
    let name = field.as_str();
    value.parse().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{name} must be a valid UUID"),
            value,
        )
    })
}

/// Parse a reorder sequence: every entry a UUID, none repeated.
pub(crate) fn parse_item_id_list(
    values: Vec<String>,
    field: FieldName,
) -> Result<Vec<ListItemId>, Error> {
    let name = field.as_str();
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let id: ListItemId = value.parse().map_err(|_| {
                index_error(
                    field,
                    ErrorCode::InvalidUuid,
                    format!("{name} must contain valid UUIDs"),
                    index,
                    value,
                )
            })?;
            if !seen.insert(id) {
                return Err(index_error(
                    field,
                    ErrorCode::DuplicateId,
                    format!("{name} must not repeat an id"),
                    index,
                    value,
                ));
            }
            Ok(id)
        })
        .collect()
}

pub(crate) fn parse_list_type(value: &str, field: FieldName) -> Result<ListType, Error> {
    let name = field.as_str();
    value.parse().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidListType,
            format!("{name} must be one of basic, todo, shopping"),
            value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let name = field.as_str();
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            value_error(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{name} must be an RFC 3339 timestamp"),
                value,
            )
        })
}

/// Require a finite, non-negative number when present.
pub(crate) fn optional_amount(value: Option<f64>, field: FieldName) -> Result<Option<f64>, Error> {
    match value {
        Some(number) if !number.is_finite() || number < 0.0 => {
            let name = field.as_str();
            Err(field_error(
                field,
                ErrorCode::InvalidNumber,
                format!("{name} must be a non-negative number"),
            ))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    const FIELD: FieldName = FieldName::new("order");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(
            require_text(Some("  milk ".to_owned()), FIELD).expect("valid"),
            "milk"
        );
        let blank = require_text(Some("   ".to_owned()), FIELD).expect_err("blank");
        assert_eq!(detail(&blank, "code"), Some(&json!("empty_value")));
        let missing = require_text(None, FIELD).expect_err("missing");
        assert_eq!(detail(&missing, "code"), Some(&json!("missing_field")));
    }

    #[rstest]
    fn duplicate_ids_report_the_repeated_index() {
        let id = "0190f5a4-7b7e-7c3e-8f00-000000000001".to_owned();
        let other = "0190f5a4-7b7e-7c3e-8f00-000000000002".to_owned();

        let err = parse_item_id_list(vec![id.clone(), other, id], FIELD).expect_err("duplicate");

        assert_eq!(detail(&err, "code"), Some(&json!("duplicate_id")));
        assert_eq!(detail(&err, "index"), Some(&json!(2)));
    }

    #[rstest]
    fn malformed_ids_report_their_index() {
        let err = parse_item_id_list(vec!["nope".to_owned()], FIELD).expect_err("malformed");

        assert_eq!(detail(&err, "code"), Some(&json!("invalid_uuid")));
        assert_eq!(detail(&err, "index"), Some(&json!(0)));
    }

    #[rstest]
    #[case("basic", ListType::Basic)]
    #[case("todo", ListType::Todo)]
    #[case("shopping", ListType::Shopping)]
    fn list_types_parse(#[case] raw: &str, #[case] expected: ListType) {
        assert_eq!(parse_list_type(raw, FIELD).expect("valid"), expected);
    }

    #[rstest]
    #[case("kanban")]
    #[case("")]
    fn unknown_list_types_are_rejected(#[case] raw: &str) {
        let err = parse_list_type(raw, FIELD).expect_err("invalid");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_list_type")));
    }

    #[rstest]
    #[case(Some(-1.0))]
    #[case(Some(f64::NAN))]
    fn negative_or_non_finite_amounts_are_rejected(#[case] value: Option<f64>) {
        assert!(optional_amount(value, FIELD).is_err());
    }

    #[rstest]
    fn long_values_are_rejected() {
        let err = bounded("abcd".to_owned(), 3, FIELD).expect_err("too long");
        assert_eq!(detail(&err, "code"), Some(&json!("too_long")));
        assert_eq!(bounded("abc".to_owned(), 3, FIELD).expect("fits"), "abc");
    }

    #[rstest]
    fn short_ids_must_be_hex() {
        assert!(parse_short_id("0a1b2c3d", FIELD).is_ok());
        assert!(parse_short_id("xyz", FIELD).is_err());
    }
}
