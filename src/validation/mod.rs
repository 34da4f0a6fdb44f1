//! Declarative request validation and store-operator sanitization.
//!
//! Every endpoint has an explicit rule set; violations are aggregated so the
//! response carries one message per failing field instead of stopping at the
//! first. Free-text fields are trimmed and HTML-escaped before they can reach
//! the store.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ApiError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_BREED_LEN: usize = 100;
pub const MAX_SPECIES_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct PetData {
    pub name: String,
    pub breed: Option<String>,
    pub species: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
}

/// Partial pet fields for updates; `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct PetUpdateData {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub species: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
}

/// Accumulates per-field violations; never short-circuits.
#[derive(Debug, Default)]
struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert(message.into());
    }

    fn into_result<T>(self, ok: T) -> Result<T, ApiError> {
        if self.errors.is_empty() {
            Ok(ok)
        } else {
            Err(ApiError::validation_error("Validation failed", self.errors))
        }
    }
}

/// Lowercase + trim; the case-normalized form is what uniqueness is keyed on.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic structural email check.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 254 {
        return false;
    }
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return false;
    }
    parts[1].contains('.') && !parts[1].starts_with('.') && !parts[1].ends_with('.')
}

/// Escape HTML-significant characters in free text before storage.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

fn string_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str)
}

/// Present-but-wrong-type detection so "age": "old" reports a type error
/// rather than being silently dropped.
fn has_field(body: &Value, field: &str) -> bool {
    body.get(field).map(|v| !v.is_null()).unwrap_or(false)
}

pub fn validate_register(body: &Value) -> Result<RegisterData, ApiError> {
    let mut errors = FieldErrors::default();

    let email = match string_field(body, "email") {
        Some(raw) => {
            let normalized = normalize_email(raw);
            if !is_valid_email(&normalized) {
                errors.push("email", "Invalid email");
            }
            normalized
        }
        None => {
            errors.push("email", "Email is required");
            String::new()
        }
    };

    let password = match string_field(body, "password") {
        Some(p) if p.trim().len() >= MIN_PASSWORD_LEN => p.trim().to_string(),
        Some(_) => {
            errors.push(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
            String::new()
        }
        None => {
            errors.push("password", "Password is required");
            String::new()
        }
    };

    let display_name = match string_field(body, "displayName") {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
                errors.push("displayName", "Display name is too long");
                None
            } else if trimmed.is_empty() {
                None
            } else {
                Some(escape_text(trimmed))
            }
        }
        None => {
            if has_field(body, "displayName") {
                errors.push("displayName", "Display name must be a string");
            }
            None
        }
    };

    errors.into_result(RegisterData {
        email,
        password,
        display_name,
    })
}

pub fn validate_login(body: &Value) -> Result<LoginData, ApiError> {
    let mut errors = FieldErrors::default();

    let email = match string_field(body, "email") {
        Some(raw) => {
            let normalized = normalize_email(raw);
            if !is_valid_email(&normalized) {
                errors.push("email", "Invalid email");
            }
            normalized
        }
        None => {
            errors.push("email", "Email is required");
            String::new()
        }
    };

    let password = match string_field(body, "password") {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => {
            errors.push("password", "Password is required");
            String::new()
        }
    };

    errors.into_result(LoginData { email, password })
}

fn optional_text(
    body: &Value,
    field: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    match string_field(body, field) {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.chars().count() > max_len {
                errors.push(field, format!("Must be at most {} characters", max_len));
                None
            } else if trimmed.is_empty() {
                None
            } else {
                Some(escape_text(trimmed))
            }
        }
        None => {
            if has_field(body, field) {
                errors.push(field, "Must be a string");
            }
            None
        }
    }
}

fn optional_age(body: &Value, errors: &mut FieldErrors) -> Option<i32> {
    match body.get("age") {
        Some(Value::Null) | None => None,
        Some(value) => match value.as_i64() {
            Some(age) if (0..=100).contains(&age) => Some(age as i32),
            _ => {
                errors.push("age", "Age must be a number between 0 and 100");
                None
            }
        },
    }
}

pub fn validate_pet_create(body: &Value) -> Result<PetData, ApiError> {
    let mut errors = FieldErrors::default();

    let name = match string_field(body, "name") {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
                errors.push(
                    "name",
                    format!("Name is required and must be at most {} characters", MAX_NAME_LEN),
                );
                String::new()
            } else {
                escape_text(trimmed)
            }
        }
        None => {
            errors.push("name", "Name is required");
            String::new()
        }
    };

    let breed = optional_text(body, "breed", MAX_BREED_LEN, &mut errors);
    let species = optional_text(body, "species", MAX_SPECIES_LEN, &mut errors);
    let description = optional_text(body, "description", MAX_DESCRIPTION_LEN, &mut errors);
    let age = optional_age(body, &mut errors);

    errors.into_result(PetData {
        name,
        breed,
        species,
        age,
        description,
    })
}

pub fn validate_pet_update(body: &Value) -> Result<PetUpdateData, ApiError> {
    let mut errors = FieldErrors::default();

    let name = match string_field(body, "name") {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
                errors.push(
                    "name",
                    format!("Name must be non-empty and at most {} characters", MAX_NAME_LEN),
                );
                None
            } else {
                Some(escape_text(trimmed))
            }
        }
        None => {
            if has_field(body, "name") {
                errors.push("name", "Name must be a string");
            }
            None
        }
    };

    let breed = optional_text(body, "breed", MAX_BREED_LEN, &mut errors);
    let species = optional_text(body, "species", MAX_SPECIES_LEN, &mut errors);
    let description = optional_text(body, "description", MAX_DESCRIPTION_LEN, &mut errors);
    let age = optional_age(body, &mut errors);

    errors.into_result(PetUpdateData {
        name,
        breed,
        species,
        age,
        description,
    })
}

/// Rewrite store-operator-like keys (`$` prefix, `.` path separators) in any
/// request-derived document before it can reach a filter or update.
///
/// Offending characters are replaced with `_`; the original key names are
/// returned so callers can raise a security event. Runs recursively over
/// nested objects and arrays.
pub fn sanitize_document(value: &mut Value) -> Vec<String> {
    let mut flagged = Vec::new();
    sanitize_inner(value, &mut flagged);
    flagged
}

fn sanitize_inner(value: &mut Value, flagged: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            let mut sanitized = Map::with_capacity(map.len());
            for key in keys {
                let mut inner = map.remove(&key).unwrap_or(Value::Null);
                sanitize_inner(&mut inner, flagged);
                if key.starts_with('$') || key.contains('.') {
                    flagged.push(key.clone());
                    sanitized.insert(key.replace(['$', '.'], "_"), inner);
                } else {
                    sanitized.insert(key, inner);
                }
            }
            *map = sanitized;
        }
        Value::Array(items) => {
            for item in items {
                sanitize_inner(item, flagged);
            }
        }
        _ => {}
    }
}
