use crate::errors::AppError;
use crate::models::parse_day;
use chrono::NaiveDate;
use serde_json::Value;

pub fn validate_count(value: Option<&Value>) -> Result<u64, AppError> {
    positive_whole(value).ok_or_else(|| AppError::bad_request("count must be a positive whole number"))
}

pub fn validate_goal(value: Option<&Value>) -> Result<u64, AppError> {
    positive_whole(value).ok_or_else(|| AppError::bad_request("goal must be a positive whole number"))
}

pub fn validate_date(value: Option<&str>) -> Result<NaiveDate, AppError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::bad_request("date is required"));
    }
    parse_day(value).ok_or_else(|| AppError::bad_request("date must be a valid YYYY-MM-DD date"))
}

pub fn validate_name(value: Option<&str>) -> Result<String, AppError> {
    let name = value.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::bad_request("enter a profile name"));
    }
    Ok(name.to_string())
}

/// Form fields arrive as numbers or numeric strings.
fn positive_whole(value: Option<&Value>) -> Option<u64> {
    let number = match value? {
        Value::Number(number) => {
            if let Some(whole) = number.as_u64() {
                return (whole > 0).then_some(whole);
            }
            number.as_f64()?
        }
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let whole = number.is_finite() && number > 0.0 && number.fract() == 0.0 && number < u64::MAX as f64;
    whole.then_some(number as u64)
}
