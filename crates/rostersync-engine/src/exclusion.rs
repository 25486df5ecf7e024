//! Ambiguous-name pre-pass.
//!
//! Two different people sharing an exact first/last name cannot be told
//! apart by the name-match rule, so every record participating in such a
//! collision is excluded from matching entirely and left for manual
//! review. Runs once, before any per-record rule.

use std::collections::HashSet;

use rostersync_core::SourceUnit;

use crate::state::ExclusionKey;

/// Build the exclusion set over the flattened, ordered staff sequence.
///
/// Every record whose `(first_name, last_name)` pair is shared by at least
/// one other record with a different `external_id` is included. Quadratic
/// over the staff count, which is bounded by institution size; collisions
/// of three or more add every participant.
#[must_use]
pub fn build(units: &[SourceUnit]) -> HashSet<ExclusionKey> {
    let staff: Vec<_> = units.iter().flat_map(|unit| unit.staff.iter()).collect();

    let mut exclusions = HashSet::new();
    for record in &staff {
        for other in &staff {
            if record.first_name == other.first_name
                && record.last_name == other.last_name
                && record.external_id != other.external_id
                && exclusions.insert(ExclusionKey::of(record))
            {
                tracing::warn!(
                    first_name = %record.first_name,
                    last_name = %record.last_name,
                    external_id = record.external_id,
                    "ambiguous name, excluding record from matching"
                );
            }
        }
    }
    exclusions
}
