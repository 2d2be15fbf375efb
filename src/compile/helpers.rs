//! Compare-value coercion and dialect helpers
//!
//! Clients send filter values as JSON; columns have schema types. Before an
//! operator emitter runs, the compare value is nudged into the column's
//! domain: date-kind fields parse and re-render through chrono, numeric
//! fields cast strings to numbers, and the list operators split the
//! CSV-string shorthand (`"a,b,c"`) into an array. Anything that cannot be
//! coerced is an invalid query, not a silent mismatch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::compile::errors::{CompileError, CompileResult};
use crate::schema::FieldType;

/// Operators whose compare value is a list.
fn takes_list(operator: &str) -> bool {
    matches!(operator, "_in" | "_nin" | "_between" | "_nbetween")
}

pub fn coerce_compare_value(
    operator: &str,
    value: &Value,
    field_type: Option<FieldType>,
) -> CompileResult<Value> {
    let value = if takes_list(operator) {
        split_csv(value)
    } else {
        value.clone()
    };

    let Some(field_type) = field_type else {
        return Ok(value);
    };

    if field_type.is_temporal() {
        map_elements(value, &|element| coerce_date(element, field_type))
    } else if field_type.is_numeric() {
        map_elements(value, &coerce_number)
    } else {
        Ok(value)
    }
}

/// `"a,b,c"` shorthand for list operators.
fn split_csv(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Array(
            s.split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn map_elements(
    value: Value,
    coerce: &dyn Fn(&Value) -> CompileResult<Value>,
) -> CompileResult<Value> {
    match value {
        Value::Array(elements) => {
            let coerced: CompileResult<Vec<Value>> = elements.iter().map(coerce).collect();
            Ok(Value::Array(coerced?))
        }
        Value::Null => Ok(Value::Null),
        other => coerce(&other),
    }
}

fn coerce_number(value: &Value) -> CompileResult<Value> {
    match value {
        Value::Number(_) | Value::Null => Ok(value.clone()),
        Value::String(s) => {
            let token = s.trim();
            if let Ok(int) = token.parse::<i64>() {
                return Ok(Value::from(int));
            }
            token
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| {
                    CompileError::InvalidQuery(format!(
                        "`{s}` is not a valid number for a numeric field"
                    ))
                })
        }
        other => Err(CompileError::InvalidQuery(format!(
            "{other} cannot be compared against a numeric field"
        ))),
    }
}

fn coerce_date(value: &Value, field_type: FieldType) -> CompileResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(parse_date(s, field_type)?)),
        // Epoch-style numbers pass through for the driver to interpret.
        Value::Number(_) | Value::Null => Ok(value.clone()),
        other => Err(CompileError::InvalidQuery(format!(
            "{other} cannot be compared against a date field"
        ))),
    }
}

/// Parse a client-supplied date/time string and re-render it in the SQL
/// spelling for the field kind.
pub fn parse_date(input: &str, field_type: FieldType) -> CompileResult<String> {
    let input = input.trim();

    if field_type == FieldType::Time {
        let time = NaiveTime::parse_from_str(input, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
            .map_err(|_| invalid_date(input))?;
        return Ok(time.format("%H:%M:%S").to_string());
    }

    let datetime = DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| invalid_date(input))?;

    Ok(match field_type {
        FieldType::Date => datetime.format("%Y-%m-%d").to_string(),
        _ => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

fn invalid_date(input: &str) -> CompileError {
    CompileError::InvalidQuery(format!("`{input}` is not a valid date/time value"))
}

/// Escape LIKE wildcards in a needle so user input matches literally.
pub fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
