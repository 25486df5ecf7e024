//! Pre-run schema checks for both record sequences.
//!
//! Typed deserialization already guarantees presence and type of the
//! required fields; these checks catch the semantically empty values a
//! remote export can still produce. A failure is fatal and aborts before
//! any reconciliation work begins.

use crate::error::ValidationError;
use crate::models::{DirectoryRecord, SourceUnit};

/// Validate every staff record across all units.
pub fn validate_source_units(units: &[SourceUnit]) -> Result<(), ValidationError> {
    for unit in units {
        for (index, record) in unit.staff.iter().enumerate() {
            let fail = |message: &str| ValidationError::SourceRecord {
                unit: unit.name.clone(),
                index,
                message: message.to_string(),
            };

            if record.first_name.is_empty() {
                return Err(fail("first_name is empty"));
            }
            if record.last_name.is_empty() {
                return Err(fail("last_name is empty"));
            }
            if record.local_id.as_str().is_empty() {
                return Err(fail("local_id is empty"));
            }
        }
    }
    Ok(())
}

/// Validate every exported directory account.
pub fn validate_directory_records(records: &[DirectoryRecord]) -> Result<(), ValidationError> {
    for (index, record) in records.iter().enumerate() {
        let fail = |message: &str| ValidationError::DirectoryRecord {
            index,
            message: message.to_string(),
        };

        if record.sam_account_name.is_empty() {
            return Err(fail("SamAccountName is empty"));
        }
        if record.given_name.is_empty() {
            return Err(fail("GivenName is empty"));
        }
        if record.surname.is_empty() {
            return Err(fail("Surname is empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceRecord;
    use serde_json::json;

    fn staff(first: &str, last: &str, local_id: &str) -> SourceRecord {
        SourceRecord {
            external_id: 1,
            local_id: local_id.into(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_valid_source_units_pass() {
        let units = vec![SourceUnit::new(
            "North High",
            vec![staff("Jane", "Doe", "1042")],
        )];
        assert!(validate_source_units(&units).is_ok());
    }

    #[test]
    fn test_empty_name_rejected_with_context() {
        let units = vec![SourceUnit::new("North High", vec![staff("", "Doe", "1042")])];
        let err = validate_source_units(&units).unwrap_err();
        assert_eq!(
            err.to_string(),
            "source record 0 in unit 'North High': first_name is empty"
        );
    }

    #[test]
    fn test_directory_records_checked_in_order() {
        let good: DirectoryRecord = serde_json::from_value(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane",
            "Surname": "Doe",
            "Enabled": true
        }))
        .unwrap();
        let bad: DirectoryRecord = serde_json::from_value(json!({
            "SamAccountName": "",
            "GivenName": "John",
            "Surname": "Smith",
            "Enabled": true
        }))
        .unwrap();

        assert!(validate_directory_records(&[good.clone()]).is_ok());

        let err = validate_directory_records(&[good, bad]).unwrap_err();
        assert_eq!(err.to_string(), "directory record 1: SamAccountName is empty");
    }
}
