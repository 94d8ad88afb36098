//! User model

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Minimal cached profile record for a user seen on this device.
///
/// The JSON shape (`id`, `name`, `birthday`, `imageURL`) is shared with the
/// records already stored under the `@users` and `@currentUser` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider-scoped user identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Birthday as reported by the provider (free-form, e.g. `01/01`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    /// Profile picture URL
    #[serde(
        default,
        rename = "imageURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
}

impl UserInfo {
    /// Create a record with just an id and a name
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birthday: None,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_birthday(mut self, birthday: Option<String>) -> Self {
        self.birthday = birthday;
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// Parse the serialized known-users list.
pub fn parse_known_users(raw: &str) -> Result<Vec<UserInfo>> {
    Ok(serde_json::from_str(raw)?)
}

/// Serialize a known-users list for storage.
pub fn render_known_users(users: &[UserInfo]) -> Result<String> {
    Ok(serde_json::to_string(users)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn serializes_image_url_with_stored_field_name() {
        let user = UserInfo::new("42", "Ann R.")
            .with_birthday(Some("01/01".to_string()))
            .with_image_url(Some("https://cdn.example.com/42.png".to_string()));

        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(
            json,
            r#"{"id":"42","name":"Ann R.","birthday":"01/01","imageURL":"https://cdn.example.com/42.png"}"#
        );
    }

    #[test]
    fn omits_missing_optional_fields() {
        let json = serde_json::to_string(&UserInfo::new("7", "Bo")).unwrap();
        assert_eq!(json, r#"{"id":"7","name":"Bo"}"#);
    }

    #[test]
    fn parses_sparse_and_null_records() {
        let users =
            parse_known_users(r#"[{"id":"42","name":"Ann"},{"id":"7","birthday":null}]"#).unwrap();
        assert_eq!(
            users,
            vec![UserInfo::new("42", "Ann"), UserInfo::new("7", "")]
        );
    }

    #[test]
    fn rejects_non_list_payload() {
        assert!(parse_known_users(r#"{"id":"42"}"#).is_err());
        assert!(parse_known_users("not json").is_err());
    }
}
