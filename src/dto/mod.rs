pub mod auth;
pub mod blind_date;
pub mod matches;
pub mod messaging;
pub mod profile;
pub mod settings;

use serde::{Deserialize, Deserializer};

/// Accepts either a JSON array of strings or one comma separated string.
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|raw| {
        let items = match raw {
            Raw::List(items) => items,
            Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "string_or_list")]
        tags: Option<Vec<String>>,
    }

    #[test]
    fn accepts_arrays_and_joined_strings() {
        let a: Holder = serde_json::from_str(r#"{"tags": ["a", " b "]}"#).unwrap();
        assert_eq!(a.tags.unwrap(), vec!["a", "b"]);

        let b: Holder = serde_json::from_str(r#"{"tags": "music, ,hiking"}"#).unwrap();
        assert_eq!(b.tags.unwrap(), vec!["music", "hiking"]);

        let c: Holder = serde_json::from_str("{}").unwrap();
        assert!(c.tags.is_none());
    }
}
