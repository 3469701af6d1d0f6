use super::error::RecordError;
use crate::model::{Gender, NewRole};
use crate::utils::truncate_chars;
use serde_json::{Map, Value};

pub const TITLE_MAX_CHARS: usize = 500;
pub const DATES_MAX_CHARS: usize = 255;
pub const CITY_MAX_CHARS: usize = 100;
pub const CATEGORY_MAX_CHARS: usize = 255;

const SOURCE_TAG: &str = "api";

const MALE_SYNONYMS: &[&str] = &["male", "мужской", "м", "m", "man"];
const FEMALE_SYNONYMS: &[&str] = &["female", "женский", "ж", "f", "woman"];

pub fn normalize_gender(raw: &str) -> Gender {
    let value = raw.trim().to_lowercase();
    if MALE_SYNONYMS.contains(&value.as_str()) {
        Gender::Male
    } else if FEMALE_SYNONYMS.contains(&value.as_str()) {
        Gender::Female
    } else {
        Gender::Any
    }
}

/// Reads a number or numeric string. Anything else, including an empty
/// string or a non-finite value, is treated as unset.
pub fn parse_amount(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Integer variant of [`parse_amount`]; fractions truncate toward zero.
pub fn parse_int(value: Option<&Value>) -> Option<i32> {
    let amount = parse_amount(value)?.trunc();
    if amount < i32::MIN as f64 || amount > i32::MAX as f64 {
        return None;
    }
    Some(amount as i32)
}

fn text_field(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn external_id(record: &Map<String, Value>) -> Result<String, RecordError> {
    let id = match record.get("roleId") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        None | Some(Value::Null) => String::new(),
        Some(_) => {
            return Err(RecordError::InvalidField {
                field: "roleId",
                expected: "a string or number",
            });
        }
    };
    if id.is_empty() {
        return Err(RecordError::MissingId);
    }
    Ok(id)
}

/// Maps one API record onto the `roles` row shape.
pub fn normalize_record(record: &Value, default_city: &str) -> Result<NewRole, RecordError> {
    let record = record.as_object().ok_or(RecordError::NotObject)?;

    let external_id = external_id(record)?;
    let gender = match record.get("gender") {
        Some(Value::String(s)) => normalize_gender(s),
        _ => Gender::Any,
    };
    let city = text_field(record, "city")?.unwrap_or_else(|| default_city.to_string());

    Ok(NewRole {
        external_id,
        title: truncate_chars(
            &text_field(record, "title")?.unwrap_or_default(),
            TITLE_MAX_CHARS,
        ),
        dates: truncate_chars(
            &text_field(record, "eventDate")?.unwrap_or_default(),
            DATES_MAX_CHARS,
        ),
        description: text_field(record, "description")?.unwrap_or_default(),
        gender,
        age_min: parse_int(record.get("age_min")),
        age_max: parse_int(record.get("age_max")),
        height_min: parse_int(record.get("height_min")),
        height_max: parse_int(record.get("height_max")),
        fee: parse_amount(record.get("fee")),
        city: truncate_chars(&city, CITY_MAX_CHARS),
        contact_info: text_field(record, "contactInfo")?.unwrap_or_default(),
        requirements: text_field(record, "requirements")?.unwrap_or_default(),
        category: truncate_chars(
            &text_field(record, "category")?.unwrap_or_default(),
            CATEGORY_MAX_CHARS,
        ),
        source: SOURCE_TAG.to_string(),
        is_active: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gender_synonyms_collapse_to_three_values() {
        for raw in ["male", "Male ", "МУЖСКОЙ", "м", "M", "man"] {
            assert_eq!(normalize_gender(raw), Gender::Male, "{raw}");
        }
        for raw in ["female", "Женский", "ж", "F", " woman"] {
            assert_eq!(normalize_gender(raw), Gender::Female, "{raw}");
        }
        for raw in ["any", "", "both", "мж", "men"] {
            assert_eq!(normalize_gender(raw), Gender::Any, "{raw}");
        }
    }

    #[test]
    fn numbers_parse_defensively() {
        assert_eq!(parse_int(Some(&json!(25))), Some(25));
        assert_eq!(parse_int(Some(&json!("25"))), Some(25));
        assert_eq!(parse_int(Some(&json!("25.9"))), Some(25));
        assert_eq!(parse_int(Some(&json!(170.4))), Some(170));
        assert_eq!(parse_int(Some(&json!(""))), None);
        assert_eq!(parse_int(Some(&json!("tall"))), None);
        assert_eq!(parse_int(Some(&json!(null))), None);
        assert_eq!(parse_int(Some(&json!([1]))), None);
        assert_eq!(parse_int(Some(&json!(1e12))), None);
        assert_eq!(parse_int(None), None);

        assert_eq!(parse_amount(Some(&json!("5000.50"))), Some(5000.5));
        assert_eq!(parse_amount(Some(&json!("NaN"))), None);
        assert_eq!(parse_amount(Some(&json!(true))), None);
    }

    #[test]
    fn full_record_is_normalized() {
        let record = json!({
            "roleId": 1017,
            "title": "Detective",
            "eventDate": "1-3 June",
            "description": "Tired but kind",
            "gender": "Мужской",
            "age_min": "30",
            "age_max": 45,
            "height_min": "",
            "height_max": null,
            "fee": "12000",
            "city": "Kazan",
            "contactInfo": "@casting_director",
            "requirements": "Beard",
            "category": "series"
        });

        let role = normalize_record(&record, "Moscow").unwrap();
        assert_eq!(role.external_id, "1017");
        assert_eq!(role.gender, Gender::Male);
        assert_eq!(role.age_min, Some(30));
        assert_eq!(role.age_max, Some(45));
        assert_eq!(role.height_min, None);
        assert_eq!(role.height_max, None);
        assert_eq!(role.fee, Some(12000.0));
        assert_eq!(role.city, "Kazan");
        assert_eq!(role.category, "series");
        assert_eq!(role.source, "api");
        assert!(role.is_active);
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let role = normalize_record(&json!({ "roleId": "abc" }), "Moscow").unwrap();
        assert_eq!(role.title, "");
        assert_eq!(role.city, "Moscow");
        assert_eq!(role.gender, Gender::Any);
        assert_eq!(role.fee, None);
    }

    #[test]
    fn long_text_is_truncated() {
        let record = json!({
            "roleId": "abc",
            "title": "т".repeat(600),
            "city": "c".repeat(150),
        });
        let role = normalize_record(&record, "Moscow").unwrap();
        assert_eq!(role.title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(role.city.chars().count(), CITY_MAX_CHARS);
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert_eq!(
            normalize_record(&json!("not a role"), "Moscow"),
            Err(RecordError::NotObject)
        );
        assert_eq!(
            normalize_record(&json!({ "title": "No id" }), "Moscow"),
            Err(RecordError::MissingId)
        );
        assert_eq!(
            normalize_record(&json!({ "roleId": "  " }), "Moscow"),
            Err(RecordError::MissingId)
        );
        assert_eq!(
            normalize_record(&json!({ "roleId": "x", "title": 12 }), "Moscow"),
            Err(RecordError::InvalidField {
                field: "title",
                expected: "a string"
            })
        );
    }
}
