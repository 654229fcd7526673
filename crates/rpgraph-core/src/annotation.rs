//! Typed node annotations: MIRIAM cross-references and computed properties.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// MIRIAM cross-references attached to a species or reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiriamAnnotation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inchikey: Vec<String>,
    #[serde(rename = "ec-code", default, skip_serializing_if = "Vec::is_empty")]
    pub ec_code: Vec<String>,
    /// Any other cross-reference type (chebi, metanetx, kegg, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, Vec<String>>,
}

impl MiriamAnnotation {
    /// Build from a raw `type -> values` mapping.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut annotation = Self::default();
        for (key, values) in map {
            match key.as_str() {
                "inchikey" => annotation.inchikey = values,
                "ec-code" => annotation.ec_code = values,
                _ => {
                    annotation.other.insert(key, values);
                }
            }
        }
        annotation
    }

    /// InChIKeys, deduplicated and in lexicographic order.
    pub fn inchikeys(&self) -> Vec<&str> {
        sorted_unique(&self.inchikey)
    }

    /// EC numbers, deduplicated and in lexicographic order.
    pub fn ec_codes(&self) -> Vec<&str> {
        sorted_unique(&self.ec_code)
    }

    pub fn is_empty(&self) -> bool {
        self.inchikey.is_empty() && self.ec_code.is_empty() && self.other.is_empty()
    }
}

/// Computed chemical properties attached to a node or to the pathway itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchikey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,
    /// Other computed values (scores, inchi, thermodynamics, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl SecondaryAnnotation {
    pub fn is_empty(&self) -> bool {
        self.inchikey.is_none() && self.smiles.is_none() && self.other.is_empty()
    }
}

fn sorted_unique(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_splits_known_keys() {
        let mut map = BTreeMap::new();
        map.insert("inchikey".to_string(), vec!["AAA-BBB-N".to_string()]);
        map.insert("ec-code".to_string(), vec!["1.1.1.1".to_string()]);
        map.insert("chebi".to_string(), vec!["CHEBI:15377".to_string()]);

        let annotation = MiriamAnnotation::from_map(map);
        assert_eq!(annotation.inchikey, vec!["AAA-BBB-N"]);
        assert_eq!(annotation.ec_code, vec!["1.1.1.1"]);
        assert_eq!(annotation.other["chebi"], vec!["CHEBI:15377"]);
    }

    #[test]
    fn test_ec_codes_sorted_and_deduplicated() {
        let annotation = MiriamAnnotation {
            ec_code: vec!["2.7.1.1".into(), "1.1.1.1".into(), "2.7.1.1".into()],
            ..Default::default()
        };
        assert_eq!(annotation.ec_codes(), vec!["1.1.1.1", "2.7.1.1"]);
    }

    #[test]
    fn test_miriam_json_shape() {
        let json = serde_json::json!({
            "inchikey": ["XLYOFNOQVPJJNP-UHFFFAOYSA-N"],
            "ec-code": ["4.2.1.-"],
            "metanetx": ["MNXM2"],
        });
        let annotation: MiriamAnnotation = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(annotation.ec_code, vec!["4.2.1.-"]);
        assert_eq!(annotation.other["metanetx"], vec!["MNXM2"]);
        assert_eq!(serde_json::to_value(&annotation).unwrap(), json);
    }

    #[test]
    fn test_secondary_keeps_extra_values() {
        let json = serde_json::json!({
            "smiles": "O",
            "global_score": 0.72,
        });
        let annotation: SecondaryAnnotation = serde_json::from_value(json).unwrap();
        assert_eq!(annotation.smiles.as_deref(), Some("O"));
        assert!(annotation.inchikey.is_none());
        assert_eq!(annotation.other["global_score"], serde_json::json!(0.72));
    }
}
