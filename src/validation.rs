//! Field-level input validation shared by the resource DTOs.
//!
//! Request bodies arrive as a JSON object. Each DTO declares its fields with
//! [`CharField`], [`IntegerField`] and [`ChoiceField`], cleans them one by one
//! and collects every failure into a [`FieldErrors`] map, so a client sees all
//! problems of a payload at once.

use std::{collections::BTreeMap, fmt, str::FromStr};

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";

pub type Payload = Map<String, Value>;

/// Field name to error messages, serialized as a plain JSON object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn check(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// JSON request body that must be an object.
pub struct JsonObject(pub Payload);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(into_object(value)?))
    }
}

/// Parses a raw body into an object. For handlers that must look something up
/// before the body is allowed to fail.
pub fn parse_object(body: &[u8]) -> Result<Payload, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("JSON parse error - {e}")))?;
    into_object(value)
}

/// A well-formed body that is not an object is a validation error.
fn into_object(value: Value) -> Result<Payload, ApiError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::Validation(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&other)
            ),
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

enum Raw<'a> {
    Missing,
    Null,
    Present(&'a Value),
}

fn lookup<'a>(payload: &'a Payload, name: &str, aliases: &[&str]) -> Raw<'a> {
    let value = std::iter::once(name)
        .chain(aliases.iter().copied())
        .find_map(|key| payload.get(key));
    match value {
        None => Raw::Missing,
        Some(Value::Null) => Raw::Null,
        Some(value) => Raw::Present(value),
    }
}

pub type FormatCheck = fn(&str) -> Result<(), String>;

#[derive(Clone)]
pub struct CharField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub format: Option<FormatCheck>,
}

impl CharField {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            required: true,
            allow_blank: false,
            max_length: None,
            format: None,
        }
    }

    /// May be omitted or blank.
    pub fn optional(name: &'static str) -> Self {
        Self {
            required: false,
            allow_blank: true,
            ..Self::required(name)
        }
    }

    /// Same rules, but absence is not an error. Used by partial updates.
    pub fn partial(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn format(mut self, check: FormatCheck) -> Self {
        self.format = Some(check);
        self
    }

    /// Returns the cleaned value, or `None` when the field is absent or
    /// invalid. Invalid input is recorded in `errors`.
    pub fn clean(&self, payload: &Payload, errors: &mut FieldErrors) -> Option<String> {
        let value = match lookup(payload, self.name, self.aliases) {
            Raw::Missing => {
                if self.required {
                    errors.add(self.name, REQUIRED);
                }
                return None;
            }
            Raw::Null => {
                errors.add(self.name, NOT_NULL);
                return None;
            }
            Raw::Present(value) => value,
        };

        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                errors.add(self.name, INVALID_STRING);
                return None;
            }
        };
        if text.is_empty() {
            if self.allow_blank {
                return Some(text);
            }
            errors.add(self.name, NOT_BLANK);
            return None;
        }

        if let Some(max) = self.max_length {
            if text.chars().count() > max {
                errors.add(
                    self.name,
                    format!("Ensure this field has no more than {max} characters."),
                );
            }
        }
        if let Some(check) = self.format {
            if let Err(message) = check(&text) {
                errors.add(self.name, message);
            }
        }

        if errors.has(self.name) {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegerField {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntegerField {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
            min: None,
            max: None,
        }
    }

    pub fn with_default(name: &'static str, default: i64) -> Self {
        Self {
            required: false,
            default: Some(default),
            ..Self::required(name)
        }
    }

    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn clean(&self, payload: &Payload, errors: &mut FieldErrors) -> Option<i64> {
        let value = match lookup(payload, self.name, &[]) {
            Raw::Missing => {
                if self.required {
                    errors.add(self.name, REQUIRED);
                }
                return self.default;
            }
            Raw::Null => {
                errors.add(self.name, NOT_NULL);
                return None;
            }
            Raw::Present(value) => value,
        };

        let Some(number) = parse_integer(value) else {
            errors.add(self.name, INVALID_INTEGER);
            return None;
        };

        if let Some(min) = self.min {
            if number < min {
                errors.add(
                    self.name,
                    format!("Ensure this value is greater than or equal to {min}."),
                );
                return None;
            }
        }
        if let Some(max) = self.max {
            if number > max {
                errors.add(
                    self.name,
                    format!("Ensure this value is less than or equal to {max}."),
                );
                return None;
            }
        }
        Some(number)
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A string restricted to the values `T` can parse from.
#[derive(Debug, Clone)]
pub struct ChoiceField {
    pub name: &'static str,
    pub required: bool,
}

impl ChoiceField {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub fn clean<T: FromStr>(&self, payload: &Payload, errors: &mut FieldErrors) -> Option<T> {
        let value = match lookup(payload, self.name, &[]) {
            Raw::Missing => {
                if self.required {
                    errors.add(self.name, REQUIRED);
                }
                return None;
            }
            Raw::Null => {
                errors.add(self.name, NOT_NULL);
                return None;
            }
            Raw::Present(value) => value,
        };

        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match text.parse::<T>() {
            Ok(choice) => Some(choice),
            Err(_) => {
                errors.add(self.name, format!("\"{text}\" is not a valid choice."));
                None
            }
        }
    }
}

lazy_static! {
    static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color regex");
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex");
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").expect("username regex");
}

pub fn hex_color(value: &str) -> Result<(), String> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err("Enter a valid hex color, e.g. #AABBCC.".into())
    }
}

pub fn email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err("Enter a valid email address.".into())
    }
}

pub fn username(value: &str) -> Result<(), String> {
    if USERNAME_RE.is_match(value) {
        Ok(())
    } else {
        Err("Enter a valid username. This value may contain only letters, \
             numbers, and @/./+/-/_ characters."
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[derive(Debug, PartialEq)]
    enum Flavor {
        Sweet,
        Sour,
    }

    impl FromStr for Flavor {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "sweet" => Ok(Flavor::Sweet),
                "sour" => Ok(Flavor::Sour),
                _ => Err(()),
            }
        }
    }

    #[test]
    fn char_field_reports_missing_null_and_blank() {
        let field = CharField::required("name");
        let mut errors = FieldErrors::new();

        assert_eq!(field.clean(&payload(json!({})), &mut errors), None);
        assert_eq!(errors.get("name"), Some(&[REQUIRED.to_string()][..]));

        let mut errors = FieldErrors::new();
        assert_eq!(field.clean(&payload(json!({"name": null})), &mut errors), None);
        assert_eq!(errors.get("name"), Some(&[NOT_NULL.to_string()][..]));

        let mut errors = FieldErrors::new();
        assert_eq!(field.clean(&payload(json!({"name": "   "})), &mut errors), None);
        assert_eq!(errors.get("name"), Some(&[NOT_BLANK.to_string()][..]));
    }

    #[test]
    fn char_field_trims_and_enforces_max_length() {
        let field = CharField::required("name").max_length(5);
        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean(&payload(json!({"name": "  Mars "})), &mut errors),
            Some("Mars".to_string())
        );
        assert!(errors.is_empty());

        assert_eq!(
            field.clean(&payload(json!({"name": "Jupiter"})), &mut errors),
            None
        );
        assert_eq!(
            errors.get("name"),
            Some(&["Ensure this field has no more than 5 characters.".to_string()][..])
        );
    }

    #[test]
    fn char_field_accepts_numbers_but_not_objects() {
        let field = CharField::required("seed");
        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean(&payload(json!({"seed": 42})), &mut errors),
            Some("42".to_string())
        );
        assert_eq!(field.clean(&payload(json!({"seed": [1]})), &mut errors), None);
        assert_eq!(errors.get("seed"), Some(&[INVALID_STRING.to_string()][..]));
    }

    #[test]
    fn char_field_falls_back_to_aliases() {
        let field = CharField::required("password_confirmation").aliases(&["password2"]);
        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean(&payload(json!({"password2": "pw"})), &mut errors),
            Some("pw".to_string())
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn blank_allowed_field_skips_format_check() {
        let field = CharField::required("email")
            .allow_blank()
            .format(email);
        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean(&payload(json!({"email": ""})), &mut errors),
            Some(String::new())
        );
        assert!(errors.is_empty());

        assert_eq!(field.clean(&payload(json!({"email": "nope"})), &mut errors), None);
        assert_eq!(
            errors.get("email"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
    }

    #[test]
    fn parse_object_separates_syntax_errors_from_wrong_shapes() {
        assert!(matches!(parse_object(b"{broken"), Err(ApiError::BadRequest(_))));

        match parse_object(b"[1, 2]") {
            Err(ApiError::Validation(errors)) => assert_eq!(
                errors.get(NON_FIELD_ERRORS),
                Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..])
            ),
            _ => panic!("a list body must be a validation error"),
        }

        let map = parse_object(br#"{"name": "Kepler"}"#).ok().unwrap();
        assert_eq!(map.get("name"), Some(&json!("Kepler")));
    }

    #[test]
    fn optional_char_field_allows_absent_and_blank() {
        let field = CharField::optional("first_name");
        let mut errors = FieldErrors::new();
        assert_eq!(field.clean(&payload(json!({})), &mut errors), None);
        assert_eq!(
            field.clean(&payload(json!({"first_name": ""})), &mut errors),
            Some(String::new())
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn integer_field_bounds_and_default() {
        let field = IntegerField::with_default("liquid_percent", 0).range(0, 100);
        let mut errors = FieldErrors::new();

        assert_eq!(field.clean(&payload(json!({})), &mut errors), Some(0));
        assert_eq!(
            field.clean(&payload(json!({"liquid_percent": 30})), &mut errors),
            Some(30)
        );
        assert_eq!(
            field.clean(&payload(json!({"liquid_percent": "45"})), &mut errors),
            Some(45)
        );
        assert_eq!(
            field.clean(&payload(json!({"liquid_percent": 100.0})), &mut errors),
            Some(100)
        );
        assert!(errors.is_empty());

        assert_eq!(
            field.clean(&payload(json!({"liquid_percent": 101})), &mut errors),
            None
        );
        assert_eq!(
            errors.get("liquid_percent"),
            Some(&["Ensure this value is less than or equal to 100.".to_string()][..])
        );

        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean(&payload(json!({"liquid_percent": -1})), &mut errors),
            None
        );
        assert_eq!(
            errors.get("liquid_percent"),
            Some(&["Ensure this value is greater than or equal to 0.".to_string()][..])
        );
    }

    #[test]
    fn integer_field_rejects_non_integers() {
        let field = IntegerField::required("n");
        for bad in [json!("abc"), json!(1.5), json!(true), json!([])] {
            let mut errors = FieldErrors::new();
            assert_eq!(field.clean(&payload(json!({ "n": bad })), &mut errors), None);
            assert_eq!(errors.get("n"), Some(&[INVALID_INTEGER.to_string()][..]));
        }
    }

    #[test]
    fn choice_field_parses_known_values_only() {
        let field = ChoiceField::required("flavor");
        let mut errors = FieldErrors::new();
        assert_eq!(
            field.clean::<Flavor>(&payload(json!({"flavor": "sour"})), &mut errors),
            Some(Flavor::Sour)
        );
        assert_eq!(
            field.clean::<Flavor>(&payload(json!({"flavor": "sweet"})), &mut errors),
            Some(Flavor::Sweet)
        );
        assert!(errors.is_empty());

        assert_eq!(
            field.clean::<Flavor>(&payload(json!({"flavor": "umami"})), &mut errors),
            None
        );
        assert_eq!(
            errors.get("flavor"),
            Some(&["\"umami\" is not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn format_checks() {
        assert!(hex_color("#AABBCC").is_ok());
        assert!(hex_color("#1e90ff").is_ok());
        assert!(hex_color("AABBCC").is_err());
        assert!(hex_color("#AABBC").is_err());
        assert!(hex_color("#GGGGGG").is_err());

        assert!(email("ada@example.com").is_ok());
        assert!(email("not-an-email").is_err());

        assert!(username("ada.lovelace+1@x").is_ok());
        assert!(username("ada lovelace").is_err());
    }

    #[test]
    fn field_errors_serialize_as_object_of_lists() {
        let mut errors = FieldErrors::new();
        errors.add("seed", "planet with this seed already exists.");
        errors.add(NON_FIELD_ERRORS, "Passwords must match.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            json!({
                "non_field_errors": ["Passwords must match."],
                "seed": ["planet with this seed already exists."],
            })
        );
        assert!(errors.to_string().contains("seed: planet with this seed"));
    }
}
