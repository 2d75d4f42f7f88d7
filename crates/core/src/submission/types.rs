//! Submission types.

use serde::{Deserialize, Deserializer};

use crate::storage::StagedFile;

/// Text fields of the contact form.
///
/// Every field is optional on the wire and defaults to an empty string.
/// JSON `null` is treated the same as an absent field, and numbers or
/// booleans are kept as their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFields {
    /// `firstName`.
    #[serde(deserialize_with = "scalar_as_string")]
    pub first_name: String,
    /// `lastName`.
    #[serde(deserialize_with = "scalar_as_string")]
    pub last_name: String,
    /// `email`.
    #[serde(deserialize_with = "scalar_as_string")]
    pub email: String,
    /// `postalCode`.
    #[serde(deserialize_with = "scalar_as_string")]
    pub postal_code: String,
    /// `message`.
    #[serde(deserialize_with = "scalar_as_string")]
    pub message: String,
}

impl ContactFields {
    /// Assign a form field by its wire name.
    ///
    /// Returns `false` for names that are not part of the form; those are
    /// ignored.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "email" => &mut self.email,
            "postalCode" => &mut self.postal_code,
            "message" => &mut self.message,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Any scalar a client may send for a text field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Flag(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// One parsed contact-form request.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Form fields.
    pub fields: ContactFields,
    /// The staged upload, present only when the request carried a file.
    pub attachment: Option<StagedFile>,
}

impl Submission {
    /// Create a submission.
    #[must_use]
    pub fn new(fields: ContactFields, attachment: Option<StagedFile>) -> Self {
        Self { fields, attachment }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_fields() {
        let mut fields = ContactFields::default();
        assert!(fields.set("firstName", "Ada".into()));
        assert!(fields.set("lastName", "Lovelace".into()));
        assert!(fields.set("email", "ada@example.com".into()));
        assert!(fields.set("postalCode", "12345".into()));
        assert!(fields.set("message", "Hello".into()));

        assert_eq!(
            fields,
            ContactFields {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                postal_code: "12345".into(),
                message: "Hello".into(),
            }
        );
    }

    #[test]
    fn test_set_unknown_field_ignored() {
        let mut fields = ContactFields::default();
        assert!(!fields.set("phone", "555-0100".into()));
        assert_eq!(fields, ContactFields::default());
    }

    #[test]
    fn test_deserialize_scalars_as_text() {
        let fields: ContactFields = serde_json::from_str(
            r#"{"firstName":"Ada","lastName":null,"email":true,"postalCode":12345,"message":-1.5}"#,
        )
        .expect("scalars should deserialize");

        assert_eq!(fields.first_name, "Ada");
        assert_eq!(fields.last_name, "");
        assert_eq!(fields.email, "true");
        assert_eq!(fields.postal_code, "12345");
        assert_eq!(fields.message, "-1.5");
    }

    #[test]
    fn test_deserialize_missing_fields_default_to_empty() {
        let fields: ContactFields =
            serde_json::from_str(r#"{"firstName":"Ada"}"#).expect("should deserialize");
        assert_eq!(
            fields,
            ContactFields {
                first_name: "Ada".into(),
                ..ContactFields::default()
            }
        );
    }
}
