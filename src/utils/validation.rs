//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::utils::errors::AppError;

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a hora (los formularios envían HH:MM)
pub fn validate_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            let mut error = ValidationError::new("time");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"HH:MM[:SS]".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor no sea negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Envolver un `ValidationError` de campo en el error de la aplicación
pub fn field_error(field: &'static str, error: ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Campo obligatorio: presente y no vacío
pub fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    match value.as_deref() {
        Some(v) if validate_not_empty(v).is_ok() => Ok(v.trim()),
        _ => Err(field_error(field, ValidationError::new("required"))),
    }
}

/// Campo de fecha obligatorio
pub fn required_date(field: &'static str, value: &Option<String>) -> Result<NaiveDate, AppError> {
    let raw = required(field, value)?;
    validate_date(raw).map_err(|e| field_error(field, e))
}

/// Campo de hora obligatorio
pub fn required_time(field: &'static str, value: &Option<String>) -> Result<NaiveTime, AppError> {
    let raw = required(field, value)?;
    validate_time(raw).map_err(|e| field_error(field, e))
}

/// Número opcional enviado como número JSON o como cadena; vacío es `None`
fn optional_number<T: FromStr>(field: &'static str, value: &Option<Value>) -> Result<Option<T>, AppError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().replace(',', "."),
        Some(_) => return Err(field_error(field, ValidationError::new("number"))),
    };

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| field_error(field, ValidationError::new("number")))
}

/// Entero opcional (contadores kilométricos), no negativo
pub fn optional_count(field: &'static str, value: &Option<Value>) -> Result<Option<i32>, AppError> {
    let parsed = optional_number::<i32>(field, value)?;
    if let Some(n) = parsed {
        validate_non_negative(n).map_err(|e| field_error(field, e))?;
    }
    Ok(parsed)
}

/// Importe opcional, no negativo
pub fn optional_amount(field: &'static str, value: &Option<Value>) -> Result<Option<Decimal>, AppError> {
    let parsed = optional_number::<Decimal>(field, value)?;
    if let Some(n) = parsed {
        validate_non_negative(n).map_err(|e| field_error(field, e))?;
    }
    Ok(parsed)
}
