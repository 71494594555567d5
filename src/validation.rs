//! Validation of forecast queries and override submissions.
//!
//! Problems are collected per field so the HTTP layer can report all of them
//! at once, e.g. `{"date": ["Date cannot be in the past"]}`.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{ForecastOverride, ForecastRequest};

/// Accepted input format for dates, e.g. `07.06.2025`
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// How far ahead a forecast may be requested or overridden
pub const MAX_FORECAST_DAYS: u64 = 10;

pub const MAX_CITY_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_STRING: &str = "Not a valid string.";

/// Field name to list of error messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Record the error of `result` under `field`, keeping the value on success
    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }
}

/// The server's current calendar date
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| "Invalid date format. Use dd.MM.yyyy".to_string())
}

/// Accept dates from `today` through `today + MAX_FORECAST_DAYS` inclusive
pub fn validate_forecast_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, String> {
    if date < today {
        return Err("Date cannot be in the past".to_string());
    }

    let limit = today.checked_add_days(Days::new(MAX_FORECAST_DAYS)).unwrap_or(NaiveDate::MAX);
    if date > limit {
        return Err(format!(
            "Date cannot be more than {MAX_FORECAST_DAYS} days in the future"
        ));
    }

    Ok(date)
}

fn validate_date_field(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, String> {
    let value = value.ok_or_else(|| REQUIRED.to_string())?;
    validate_forecast_date(parse_date(value)?, today)
}

fn validate_city(value: Option<&str>, max_length: Option<usize>) -> Result<String, String> {
    let city = value.ok_or_else(|| REQUIRED.to_string())?.trim();
    if city.is_empty() {
        return Err(BLANK.to_string());
    }
    match max_length {
        Some(max_length) if city.chars().count() > max_length => Err(format!(
            "Ensure this field has no more than {max_length} characters."
        )),
        _ => Ok(city.to_string()),
    }
}

/// Text of a JSON body field; numbers are taken as their textual form
fn text_field(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(INVALID_STRING.to_string()),
    }
}

/// Temperature from a JSON number or a numeric string
fn number_field(value: Option<&Value>) -> Result<f64, String> {
    let number = match value {
        None | Some(Value::Null) => return Err(REQUIRED.to_string()),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| INVALID_NUMBER.to_string())
}

/// Raw `GET /forecast/` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
    pub date: Option<String>,
}

impl ForecastQuery {
    pub fn validate(&self, today: NaiveDate) -> Result<ForecastRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let city = errors.check("city", validate_city(self.city.as_deref(), None));
        let date = errors.check("date", validate_date_field(self.date.as_deref(), today));

        match (city, date) {
            (Some(city), Some(date)) => Ok(ForecastRequest { city, date }),
            _ => Err(errors),
        }
    }
}

/// Raw `POST /forecast/` body.
///
/// Fields stay untyped JSON so a wrong type is reported against its field
/// instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverrideForm {
    pub city: Option<Value>,
    pub date: Option<Value>,
    pub min_temperature: Option<Value>,
    pub max_temperature: Option<Value>,
}

impl OverrideForm {
    /// Field checks first; the min/max ordering is only checked once every
    /// field is individually valid
    pub fn validate(&self, today: NaiveDate) -> Result<ForecastOverride, FieldErrors> {
        let mut errors = FieldErrors::new();
        let city = errors.check(
            "city",
            text_field(self.city.as_ref())
                .and_then(|city| validate_city(city.as_deref(), Some(MAX_CITY_LENGTH))),
        );
        let date = errors.check(
            "date",
            text_field(self.date.as_ref()).and_then(|date| validate_date_field(date.as_deref(), today)),
        );
        let min = errors.check("min_temperature", number_field(self.min_temperature.as_ref()));
        let max = errors.check("max_temperature", number_field(self.max_temperature.as_ref()));

        let (Some(city), Some(date), Some(min), Some(max)) = (city, date, min, max) else {
            return Err(errors);
        };

        if min > max {
            errors.add(
                "min_temperature",
                "min_temperature must be less than or equal to max_temperature",
            );
            return Err(errors);
        }

        Ok(ForecastOverride::new(city, date, min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn today_fixed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn format(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    fn shifted(days: i64) -> NaiveDate {
        today_fixed() + chrono::Duration::days(days)
    }

    #[rstest]
    #[case(0, true)]
    #[case(1, true)]
    #[case(10, true)]
    #[case(-1, false)]
    #[case(11, false)]
    #[case(-365, false)]
    fn test_validate_forecast_date_range(#[case] offset: i64, #[case] accepted: bool) {
        let result = validate_forecast_date(shifted(offset), today_fixed());
        assert_eq!(result.is_ok(), accepted, "offset {offset}");
    }

    #[test]
    fn test_validate_forecast_date_messages() {
        assert_eq!(
            validate_forecast_date(shifted(-1), today_fixed()).unwrap_err(),
            "Date cannot be in the past"
        );
        assert_eq!(
            validate_forecast_date(shifted(11), today_fixed()).unwrap_err(),
            "Date cannot be more than 10 days in the future"
        );
    }

    #[rstest]
    #[case("11.06.2025", Some((2025, 6, 11)))]
    #[case("01.01.2026", Some((2026, 1, 1)))]
    #[case("2025-06-11", None)]
    #[case("31.02.2025", None)]
    #[case("yesterday", None)]
    #[case("", None)]
    fn test_parse_date(#[case] input: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(input).ok(), expected);
    }

    #[test]
    fn test_parse_date_error_message() {
        assert_eq!(parse_date("2025-06-11").unwrap_err(), "Invalid date format. Use dd.MM.yyyy");
    }

    #[test]
    fn test_forecast_query_valid() {
        let query = ForecastQuery {
            city: Some("BlaBla".to_string()),
            date: Some(format(today_fixed())),
        };
        let request = query.validate(today_fixed()).unwrap();
        assert_eq!(request.city, "BlaBla");
        assert_eq!(request.date, today_fixed());
    }

    #[test]
    fn test_forecast_query_collects_all_errors() {
        let errors = ForecastQuery::default().validate(today_fixed()).unwrap_err();
        assert_eq!(errors.messages("city"), [REQUIRED.to_string()]);
        assert_eq!(errors.messages("date"), [REQUIRED.to_string()]);
    }

    #[rstest]
    #[case(-1)]
    #[case(11)]
    fn test_forecast_query_rejects_out_of_range(#[case] offset: i64) {
        let query = ForecastQuery {
            city: Some("BlaBla".to_string()),
            date: Some(format(shifted(offset))),
        };
        let errors = query.validate(today_fixed()).unwrap_err();
        assert!(errors.contains("date"));
        assert!(!errors.contains("city"));
    }

    #[test]
    fn test_forecast_query_rejects_blank_city() {
        let query = ForecastQuery {
            city: Some("   ".to_string()),
            date: Some(format(today_fixed())),
        };
        let errors = query.validate(today_fixed()).unwrap_err();
        assert_eq!(errors.messages("city"), [BLANK.to_string()]);
    }

    fn form(min: f64, max: f64, offset: i64) -> OverrideForm {
        OverrideForm {
            city: Some(json!("BlaBla")),
            date: Some(json!(format(shifted(offset)))),
            min_temperature: Some(json!(min)),
            max_temperature: Some(json!(max)),
        }
    }

    #[test]
    fn test_override_form_valid() {
        let record = form(10.0, 20.0, 0).validate(today_fixed()).unwrap();
        assert_eq!(record, ForecastOverride::new("BlaBla", today_fixed(), 10.0, 20.0));
    }

    #[test]
    fn test_override_form_equal_temperatures_allowed() {
        assert!(form(15.0, 15.0, 10).validate(today_fixed()).is_ok());
    }

    #[test]
    fn test_override_form_min_above_max() {
        let errors = form(20.0, 10.0, 0).validate(today_fixed()).unwrap_err();
        assert_eq!(
            errors.messages("min_temperature"),
            ["min_temperature must be less than or equal to max_temperature".to_string()]
        );
        assert!(!errors.contains("max_temperature"));
    }

    #[test]
    fn test_override_form_date_checked_before_ordering() {
        let errors = form(20.0, 10.0, 11).validate(today_fixed()).unwrap_err();
        assert!(errors.contains("date"));
        assert!(!errors.contains("min_temperature"));
    }

    #[test]
    fn test_override_form_missing_fields() {
        let errors = OverrideForm::default().validate(today_fixed()).unwrap_err();
        for field in ["city", "date", "min_temperature", "max_temperature"] {
            assert_eq!(errors.messages(field), [REQUIRED.to_string()], "{field}");
        }
    }

    #[test]
    fn test_override_form_city_too_long() {
        let mut long = form(1.0, 2.0, 0);
        long.city = Some(json!("x".repeat(MAX_CITY_LENGTH + 1)));
        let errors = long.validate(today_fixed()).unwrap_err();
        assert!(errors.contains("city"));
    }

    #[rstest]
    #[case(json!(10), 10.0)]
    #[case(json!(-3.5), -3.5)]
    #[case(json!("10"), 10.0)]
    #[case(json!(" 7.25 "), 7.25)]
    fn test_override_form_accepts_numeric_values(#[case] min: Value, #[case] expected: f64) {
        let mut body = form(0.0, 20.0, 0);
        body.min_temperature = Some(min);
        let record = body.validate(today_fixed()).unwrap();
        assert_eq!(record.min_temperature, expected);
    }

    #[rstest]
    #[case(json!("abc"))]
    #[case(json!(""))]
    #[case(json!("NaN"))]
    #[case(json!(true))]
    #[case(json!([1]))]
    fn test_override_form_rejects_non_numeric_temperature(#[case] min: Value) {
        let mut body = form(0.0, 20.0, 0);
        body.min_temperature = Some(min);
        let errors = body.validate(today_fixed()).unwrap_err();
        assert_eq!(errors.messages("min_temperature"), [INVALID_NUMBER.to_string()]);
        assert!(!errors.contains("max_temperature"));
    }

    #[test]
    fn test_override_form_null_temperature_is_missing() {
        let mut body = form(0.0, 20.0, 0);
        body.max_temperature = Some(Value::Null);
        let errors = body.validate(today_fixed()).unwrap_err();
        assert_eq!(errors.messages("max_temperature"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_override_form_city_types() {
        let mut numeric = form(1.0, 2.0, 0);
        numeric.city = Some(json!(5));
        assert_eq!(numeric.validate(today_fixed()).unwrap().city, "5");

        let mut object = form(1.0, 2.0, 0);
        object.city = Some(json!({"name": "BlaBla"}));
        let errors = object.validate(today_fixed()).unwrap_err();
        assert_eq!(errors.messages("city"), [INVALID_STRING.to_string()]);
    }

    #[test]
    fn test_override_form_from_json_body() {
        let body: OverrideForm = serde_json::from_value(json!({
            "city": "BlaBla",
            "date": format(today_fixed()),
            "min_temperature": "abc",
            "max_temperature": 20
        }))
        .unwrap();
        let errors = body.validate(today_fixed()).unwrap_err();
        assert!(errors.contains("min_temperature"));
        assert!(!errors.contains("city"));
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("date", "Date cannot be in the past");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"date": ["Date cannot be in the past"]})
        );
    }
}
