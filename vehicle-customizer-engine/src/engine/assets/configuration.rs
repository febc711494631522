use serde::{Deserialize, Serialize};

/// One persisted selection, as stored by the external configuration store.
/// `title` is the canonical slot label at save time; on load it is only a
/// hint, resolved through the rehydration fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOptionRecord {
    pub option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "colorCode", default, skip_serializing_if = "Option::is_none")]
    pub colour_code: Option<String>,
    #[serde(default)]
    pub price: u32,
}

/// The full configuration record exchanged with the external store and the
/// booking flow. The engine holds this shape only as an in-memory snapshot;
/// persistence and scheduling happen on the other side of the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub model: String,
    pub year: u16,
    pub selected_options: Vec<SelectedOptionRecord>,
    /// JPEG preview as a data URI, if a capture was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub total_amount: u32,
    pub booking_status: String,
}

/// Initial status for configurations that have not entered the booking flow.
pub const BOOKING_STATUS_PENDING: &str = "pending";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_backend_field_names() {
        let record = SelectedOptionRecord {
            option: "opt-1".into(),
            title: Some("Hood".into()),
            colour_code: Some("#112233".into()),
            price: 500,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["option"], "opt-1");
        assert_eq!(json["colorCode"], "#112233");
        assert!(json.get("colour_code").is_none());
    }

    #[test]
    fn configuration_round_trips_through_json() {
        let config = SavedConfiguration {
            customer_id: Some("cust-9".into()),
            model: "Thar".into(),
            year: 2023,
            selected_options: vec![SelectedOptionRecord {
                option: "opt-1".into(),
                title: Some("Rim".into()),
                colour_code: None,
                price: 300,
            }],
            image: None,
            notes: Some("matte finish".into()),
            total_amount: 300,
            booking_status: BOOKING_STATUS_PENDING.into(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SavedConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
