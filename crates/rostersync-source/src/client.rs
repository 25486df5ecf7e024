//! Source System staff retrieval.
//!
//! Two endpoints per unit: a staff count, then the staff listing. The
//! listing caps pages at 100 records and signals nothing about further
//! pages, so the count drives how many pages to fetch.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use rostersync_core::{OpaqueId, SourceRecord, SourceUnit, UnitSelector};

use crate::auth::SourceAuth;
use crate::error::{SourceError, SourceResult};

/// Records per listing page, fixed by the remote API.
const PAGE_SIZE: u32 = 100;

/// Expansion and extension fields requested alongside the core staff
/// attributes; passed through into each record's raw attribute map.
const STAFF_EXPANSIONS: &str = "emails,addresses,phones,school_affiliations";
const STAFF_EXTENSIONS: &str = "u_dyn_schoolstaff_1,u_schoolstaffuserfields";

/// HTTP client for the Source System staff API.
#[derive(Debug, Clone)]
pub struct SourceClient {
    base_url: String,
    auth: SourceAuth,
    http_client: reqwest::Client,
}

impl SourceClient {
    /// Create a client for the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth: SourceAuth, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            http_client,
        }
    }

    /// Retrieve the staff of every configured unit, in configuration order.
    pub async fn fetch_units(&self, selectors: &[UnitSelector]) -> SourceResult<Vec<SourceUnit>> {
        let mut units = Vec::with_capacity(selectors.len());
        for selector in selectors {
            units.push(self.fetch_unit(selector).await?);
        }
        Ok(units)
    }

    /// Retrieve one unit: count first, then as many listing pages as the
    /// count requires.
    pub async fn fetch_unit(&self, selector: &UnitSelector) -> SourceResult<SourceUnit> {
        let token = self.auth.access_token().await?;
        let count = self.fetch_staff_count(&selector.id, &token).await?;
        debug!(unit = %selector.label(), count, "staff count retrieved");

        let mut staff = self.fetch_staff_page(&selector.id, &token, None).await?;
        let mut page = 2;
        while (u64::from(page) - 1) * u64::from(PAGE_SIZE) < u64::from(count) {
            let more = self
                .fetch_staff_page(&selector.id, &token, Some(page))
                .await?;
            staff.extend(more);
            page += 1;
        }

        info!(unit = %selector.label(), staff = staff.len(), "unit retrieved");
        Ok(SourceUnit {
            name: selector.label().to_string(),
            id: Some(selector.id.clone()),
            staff,
        })
    }

    async fn fetch_staff_count(&self, unit_id: &str, token: &str) -> SourceResult<u32> {
        let endpoint = format!("{}/ws/v1/school/{}/staff/count", self.base_url, unit_id);
        let response: CountResponse = self.get_json(&endpoint, token).await?;
        Ok(response.resource.count)
    }

    async fn fetch_staff_page(
        &self,
        unit_id: &str,
        token: &str,
        page: Option<u32>,
    ) -> SourceResult<Vec<SourceRecord>> {
        let mut endpoint = format!(
            "{}/ws/v1/school/{}/staff?expansions={}&extensions={}",
            self.base_url, unit_id, STAFF_EXPANSIONS, STAFF_EXTENSIONS
        );
        if let Some(page) = page {
            endpoint.push_str(&format!("&page={page}"));
        }

        let response: StaffListResponse = self.get_json(&endpoint, token).await?;
        Ok(response
            .staffs
            .staff
            .into_iter()
            .map(WireStaff::into_record)
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> SourceResult<T> {
        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    resource: CountResource,
}

#[derive(Debug, Deserialize)]
struct CountResource {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct StaffListResponse {
    staffs: StaffList,
}

#[derive(Debug, Deserialize)]
struct StaffList {
    #[serde(default)]
    staff: Vec<WireStaff>,
}

/// One staff member as the API ships it: identifiers at the top level, the
/// name nested, everything else kept raw.
#[derive(Debug, Deserialize)]
struct WireStaff {
    users_dcid: i64,
    local_id: OpaqueId,
    name: WireName,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireName {
    first_name: String,
    last_name: String,
}

impl WireStaff {
    fn into_record(self) -> SourceRecord {
        SourceRecord {
            external_id: self.users_dcid,
            local_id: self.local_id,
            first_name: self.name.first_name,
            last_name: self.name.last_name,
            extra: self.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_staff_conversion_keeps_extra_attributes() {
        let wire: WireStaff = serde_json::from_value(json!({
            "users_dcid": 4,
            "local_id": 3,
            "name": { "first_name": "The", "last_name": "Developer" },
            "admin_username": "thedev",
            "emails": { "work_email": "dev@example.org" }
        }))
        .unwrap();

        let record = wire.into_record();
        assert_eq!(record.external_id, 4);
        assert_eq!(record.local_id.as_str(), "3");
        assert_eq!(record.first_name, "The");
        assert_eq!(record.last_name, "Developer");
        assert_eq!(
            record.extra.get("admin_username"),
            Some(&json!("thedev"))
        );
        assert!(record.extra.contains_key("emails"));
    }

    #[test]
    fn test_staff_list_tolerates_missing_staff_key() {
        let response: StaffListResponse = serde_json::from_value(json!({
            "staffs": {}
        }))
        .unwrap();
        assert!(response.staffs.staff.is_empty());
    }
}
