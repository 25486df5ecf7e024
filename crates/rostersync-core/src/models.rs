//! Typed views over Source and Directory records.
//!
//! Both systems hand us loosely-shaped JSON. The models pin down the fields
//! reconciliation depends on and carry everything else through untouched in
//! a flattened attribute map, so diagnostic output can show fields the
//! engine itself never interprets.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{LAST_LOGON_ATTRIBUTE, MISSING_FIELD_PLACEHOLDER, SERVICE_ACCOUNT_PREFIX};

/// An identifier whose wire representation may be a JSON string or integer.
///
/// The Source System exports `local_id` as either, depending on how the
/// record was entered. Both forms compare and display identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OpaqueId(String);

impl OpaqueId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OpaqueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OpaqueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for OpaqueId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for OpaqueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number for opaque id, got {other}"
            ))),
        }
    }
}

/// One staff member as supplied by the Source System.
///
/// Immutable during a run; the engine never writes to the source side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Canonical cross-system identifier ("DCID").
    pub external_id: i64,
    /// Source-local identifier ("Teacher Number"); also carries the
    /// service-account naming prefix.
    pub local_id: OpaqueId,
    pub first_name: String,
    pub last_name: String,
    /// Raw pass-through of every other exported attribute (emails, phones,
    /// affiliations). Diagnostic display only.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl SourceRecord {
    /// Whether the local id carries the service-account prefix.
    #[must_use]
    pub fn is_service_account(&self) -> bool {
        self.local_id.as_str().starts_with(SERVICE_ACCOUNT_PREFIX)
    }
}

/// An ordered group of staff records belonging to one school/unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub staff: Vec<SourceRecord>,
}

impl SourceUnit {
    #[must_use]
    pub fn new(name: impl Into<String>, staff: Vec<SourceRecord>) -> Self {
        Self {
            name: name.into(),
            id: None,
            staff,
        }
    }
}

/// One account as exported from the Directory System.
///
/// The export uses PascalCase keys. Fields reconciliation branches on are
/// typed; everything else (the sync attribute, `EmployeeID`, timestamps)
/// stays in `attributes` because their names are configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryRecord {
    /// Unique account handle.
    pub sam_account_name: String,
    pub given_name: String,
    pub surname: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of: Option<Vec<String>>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl DirectoryRecord {
    /// String value of an exported attribute. Non-string values are `None`;
    /// the no-sync sentinel only counts when the attribute is an actual
    /// string.
    #[must_use]
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Integer value of an exported attribute. Accepts JSON integers and
    /// strings holding a whole base-10 integer; anything else is `None`.
    #[must_use]
    pub fn attribute_i64(&self, name: &str) -> Option<i64> {
        match self.attributes.get(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether the account is a member of the named directory group.
    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        self.member_of
            .as_ref()
            .is_some_and(|groups| groups.iter().any(|g| g == group))
    }

    /// Last-logon timestamp for diagnostic display, or the `undefined`
    /// placeholder when the export did not include one.
    #[must_use]
    pub fn last_logon_display(&self) -> String {
        match self.attributes.get(LAST_LOGON_ATTRIBUTE) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => MISSING_FIELD_PLACEHOLDER.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(json: Value) -> DirectoryRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_opaque_id_from_string_or_number() {
        let from_string: OpaqueId = serde_json::from_value(json!("T-42")).unwrap();
        assert_eq!(from_string.as_str(), "T-42");

        let from_number: OpaqueId = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(from_number.as_str(), "3");
        assert_eq!(from_number.to_string(), "3");

        assert!(serde_json::from_value::<OpaqueId>(json!(["nope"])).is_err());
    }

    #[test]
    fn test_source_record_service_account_prefix() {
        let record = SourceRecord {
            external_id: 9,
            local_id: "SVC-000".into(),
            first_name: "Print".to_string(),
            last_name: "Queue".to_string(),
            extra: serde_json::Map::new(),
        };
        assert!(record.is_service_account());

        let person = SourceRecord {
            local_id: "1042".into(),
            ..record.clone()
        };
        assert!(!person.is_service_account());

        // Prefix match is case-sensitive.
        let lowercase = SourceRecord {
            local_id: "svc-000".into(),
            ..record
        };
        assert!(!lowercase.is_service_account());
    }

    #[test]
    fn test_directory_record_pascal_case_wire_format() {
        let record = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true,
            "MemberOf": ["Staff", "No-Sync"],
            "extensionAttribute1": "1234"
        }));

        assert_eq!(record.sam_account_name, "jdoe");
        assert_eq!(record.given_name, "Jane");
        assert_eq!(record.surname, "Doe");
        assert!(record.enabled);
        assert!(record.is_member_of("No-Sync"));
        assert!(!record.is_member_of("Admins"));
        assert_eq!(record.attribute_str("extensionAttribute1"), Some("1234"));
    }

    #[test]
    fn test_attribute_i64_accepts_number_and_numeric_string() {
        let record = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true,
            "extensionAttribute1": "1234",
            "EmployeeID": 567,
            "Office": "12b"
        }));

        assert_eq!(record.attribute_i64("extensionAttribute1"), Some(1234));
        assert_eq!(record.attribute_i64("EmployeeID"), Some(567));
        // Trailing garbage never matches.
        assert_eq!(record.attribute_i64("Office"), None);
        assert_eq!(record.attribute_i64("missing"), None);
    }

    #[test]
    fn test_last_logon_display_placeholder() {
        let absent = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true
        }));
        assert_eq!(absent.last_logon_display(), "undefined");

        let present = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true,
            "LastLogonTimestamp": "133497266154201619"
        }));
        assert_eq!(present.last_logon_display(), "133497266154201619");

        let numeric = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true,
            "LastLogonTimestamp": 133497266154201619i64
        }));
        assert_eq!(numeric.last_logon_display(), "133497266154201619");
    }

    #[test]
    fn test_member_of_absent() {
        let record = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": false
        }));
        assert!(record.member_of.is_none());
        assert!(!record.is_member_of("Staff"));
    }
}
