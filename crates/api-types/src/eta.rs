//! Estimated arrival tables computed by the backend.

use serde::{Deserialize, Serialize};

/// Arrivals at one stop of a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaEntry {
    /// Display name of the stop.
    pub stop: String,

    #[serde(default)]
    pub arrivals: Vec<String>,
}

/// Response body of the ETA endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaTable {
    #[serde(default)]
    pub etas: Vec<EtaEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_etas_is_empty_table() {
        let table: EtaTable = serde_json::from_str("{}").unwrap();
        assert!(table.etas.is_empty());
    }

    #[test]
    fn test_entry_without_arrivals() {
        let table: EtaTable = serde_json::from_str(
            r#"{"etas": [{"stop": "Depot"}, {"stop": "Piazza", "arrivals": ["07:33", "08:03"]}]}"#,
        )
        .unwrap();

        assert_eq!(table.etas[0].arrivals, Vec::<String>::new());
        assert_eq!(table.etas[1].arrivals, vec!["07:33", "08:03"]);
    }
}
