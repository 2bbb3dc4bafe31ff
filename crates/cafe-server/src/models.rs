//! Cafe entity and form coercion.

use serde::{Deserialize, Serialize};

/// A single cafe record.
///
/// The field declaration order is the JSON field order: `serde_json` emits
/// the fields exactly as listed here, `id` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cafe {
    pub id: i64,
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub has_sockets: bool,
    pub can_take_calls: bool,
    pub coffee_price: Option<String>,
}

/// Candidate record for insertion; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCafe {
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub has_sockets: bool,
    pub can_take_calls: bool,
    pub coffee_price: Option<String>,
}

/// Coerce a raw form value into a boolean.
///
/// Presence-based: any non-empty string is true, including the literal text
/// "False"; an empty string is false.
pub fn form_bool(raw: &str) -> bool {
    !raw.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_form_values_are_truthy() {
        assert!(form_bool("1"));
        assert!(form_bool("true"));
        assert!(form_bool("False"));
        assert!(form_bool(" "));
    }

    #[test]
    fn empty_form_value_is_false() {
        assert!(!form_bool(""));
    }

    #[test]
    fn cafe_serializes_every_field_in_declaration_order() {
        let cafe = Cafe {
            id: 7,
            name: "Grounds".to_string(),
            map_url: "https://maps.example.com/grounds".to_string(),
            img_url: "https://img.example.com/grounds.jpg".to_string(),
            location: "London".to_string(),
            seats: "20-30".to_string(),
            has_toilet: true,
            has_wifi: true,
            has_sockets: false,
            can_take_calls: false,
            coffee_price: Some("£2.50".to_string()),
        };

        let json = serde_json::to_string(&cafe).unwrap();
        assert!(json.starts_with(r#"{"id":7,"name":"Grounds""#));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "name",
            "map_url",
            "img_url",
            "location",
            "seats",
            "has_toilet",
            "has_wifi",
            "has_sockets",
            "can_take_calls",
            "coffee_price",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(object.len(), 11);
    }
}
