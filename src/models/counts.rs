//! Stored aggregate records.

use serde::{Deserialize, Serialize};

/// Number of cases for one category of one press release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    /// Storage key of the owning link
    pub link: String,

    #[serde(rename = "prefecture")]
    pub category: String,

    #[serde(rename = "people")]
    pub count: u64,
}

/// Number of cases across all categories of one press release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Total {
    /// Storage key of the owning link
    pub link: String,

    #[serde(rename = "total")]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_field_names() {
        let count = CategoryCount {
            link: "abc".to_string(),
            category: "東京都".to_string(),
            count: 3,
        };
        let value = serde_json::to_value(&count).unwrap();
        assert_eq!(value["prefecture"], "東京都");
        assert_eq!(value["people"], 3);

        let total = Total {
            link: "abc".to_string(),
            count: 10,
        };
        assert_eq!(serde_json::to_value(&total).unwrap()["total"], 10);
    }
}
