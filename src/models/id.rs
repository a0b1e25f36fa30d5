//! # models::id — user ids as strings
//!
//! The backend sends user ids as JSON integers, some older endpoints as
//! strings.  Both decode into `String`; serialization always writes a string.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s)     => s,
            RawId::Signed(n)   => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "super::opt_string_or_number")]
        other: Option<String>,
    }

    #[test]
    fn test_accepts_both_shapes() {
        let h: Holder = serde_json::from_str(r#"{"id": 7, "other": "8"}"#).unwrap();
        assert_eq!((h.id.as_str(), h.other.as_deref()), ("7", Some("8")));

        let h: Holder = serde_json::from_str(r#"{"id": "abc", "other": null}"#).unwrap();
        assert_eq!((h.id.as_str(), h.other), ("abc", None));

        let h: Holder = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(h.other, None);
    }

    #[test]
    fn test_rejects_other_types() {
        assert!(serde_json::from_str::<Holder>(r#"{"id": 1.5}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"id": true}"#).is_err());
    }
}
