//! Lenient wire parsing for indicator records.
//!
//! Values arrive as numbers, numeric strings or null. Anything else (including
//! NaN/inf spelled as strings) reads as a missing value. A record whose country
//! or year cannot be read is dropped and counted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use rc_core::IndicatorRecord;

use crate::{IoError, IoResult};

/// Number, numeric string, or nothing.
pub fn lenient_f64(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Integral number or integral string that fits a year.
pub fn lenient_year(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
                .map(|f| f as i32),
        },
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// `deserialize_with` adapter for optional lenient numbers.
pub fn lenient_opt_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(lenient_f64(&v))
}

/// `deserialize_with` adapter turning strings, booleans and numbers into text.
pub fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) => Some(s),
        Value::Bool(true) => Some("*".to_string()),
        Value::Bool(false) => Some("-".to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn record_from(v: &Value) -> Option<IndicatorRecord> {
    let obj = v.as_object()?;
    let country = obj.get("country")?.as_str()?.trim();
    if country.is_empty() {
        return None;
    }
    let year = lenient_year(obj.get("year")?)?;
    let value = obj.get("value").and_then(lenient_f64);
    Some(IndicatorRecord::new(country, year, value))
}

/// Records from a JSON array; returns the kept records and how many were dropped.
pub fn parse_records(v: &Value, pointer: &str) -> IoResult<(Vec<IndicatorRecord>, usize)> {
    let arr = v.as_array().ok_or_else(|| IoError::Json {
        pointer: pointer.to_string(),
        msg: "expected an array of records".to_string(),
    })?;
    let records: Vec<IndicatorRecord> = arr.iter().filter_map(record_from).collect();
    let dropped = arr.len() - records.len();
    Ok((records, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(lenient_f64(&json!(12.5)), Some(12.5));
        assert_eq!(lenient_f64(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(lenient_f64(&json!("n/a")), None);
        assert_eq!(lenient_f64(&json!("NaN")), None);
        assert_eq!(lenient_f64(&json!("inf")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
        assert_eq!(lenient_f64(&json!(true)), None);
    }

    #[test]
    fn years() {
        assert_eq!(lenient_year(&json!(2021)), Some(2021));
        assert_eq!(lenient_year(&json!(2021.0)), Some(2021));
        assert_eq!(lenient_year(&json!("2021")), Some(2021));
        assert_eq!(lenient_year(&json!(2021.5)), None);
        assert_eq!(lenient_year(&json!(1e12)), None);
    }

    #[test]
    fn parse_keeps_null_values_and_drops_broken_rows() {
        let v = json!([
            {"country": "FR", "year": 2021, "value": 3},
            {"country": "DE", "year": "2020", "value": null},
            {"country": "IT", "year": 2020, "value": "abc"},
            {"country": "", "year": 2020, "value": 1},
            {"year": 2020, "value": 1},
            {"country": "ES", "year": "soon", "value": 1},
            17
        ]);
        let (rs, dropped) = parse_records(&v, "/x").unwrap();
        assert_eq!(dropped, 4);
        assert_eq!(rs.len(), 3);
        assert_eq!(rs[0], IndicatorRecord::new("FR", 2021, Some(3.0)));
        assert_eq!(rs[1], IndicatorRecord::new("DE", 2020, None));
        assert_eq!(rs[2].value, None);
    }

    #[test]
    fn non_array_is_an_error() {
        let err = parse_records(&json!({"a": 1}), "/kpi").unwrap_err();
        assert!(matches!(err, IoError::Json { ref pointer, .. } if pointer == "/kpi"));
    }
}
