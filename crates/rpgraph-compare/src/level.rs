//! Abstraction levels for species and reaction labels.
//!
//! Species are abstracted by keeping the leading dash-separated segments of
//! their InChIKey (3 = full key). Reactions keep the leading dot-separated
//! segments of their EC number (4 = full number), with wildcard `-`
//! segments dropped. Level 0 means the raw node id; reaction level -1 means
//! the reaction SMILES.

use rpgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Information content of a full InChIKey.
pub const MAX_SPECIES_INFO: u8 = 3;
/// Information content of a full EC number.
pub const MAX_REACTION_INFO: u8 = 4;

/// Requested species abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesSpecificity {
    RawId,
    /// Keep this many InChIKey segments, and generate every finer level too.
    Inchikey(u8),
}

impl TryFrom<i32> for SpeciesSpecificity {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::RawId),
            1..=3 => Ok(Self::Inchikey(value as u8)),
            _ => Err(Error::InvalidAbstractionLevel {
                kind: "species",
                value,
            }),
        }
    }
}

impl SpeciesSpecificity {
    /// Layers to generate, most specific first.
    pub fn layers(self) -> Vec<SpeciesLayer> {
        match self {
            Self::RawId => vec![SpeciesLayer::RawId],
            Self::Inchikey(n) => (n..=MAX_SPECIES_INFO)
                .rev()
                .map(SpeciesLayer::Inchikey)
                .collect(),
        }
    }
}

/// Requested reaction abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionSpecificity {
    Smiles,
    RawId,
    /// Keep this many EC segments, and generate every finer level too.
    Ec(u8),
}

impl TryFrom<i32> for ReactionSpecificity {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Self::Smiles),
            0 => Ok(Self::RawId),
            1..=4 => Ok(Self::Ec(value as u8)),
            _ => Err(Error::InvalidAbstractionLevel {
                kind: "reaction",
                value,
            }),
        }
    }
}

impl ReactionSpecificity {
    /// Layers to generate, most specific first.
    pub fn layers(self) -> Vec<ReactionLayer> {
        match self {
            Self::Smiles => vec![ReactionLayer::Smiles],
            Self::RawId => vec![ReactionLayer::RawId],
            Self::Ec(n) => (n..=MAX_REACTION_INFO)
                .rev()
                .map(ReactionLayer::Ec)
                .collect(),
        }
    }
}

/// One species labelling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesLayer {
    RawId,
    Inchikey(u8),
}

impl SpeciesLayer {
    pub fn info(self) -> u8 {
        match self {
            Self::RawId => MAX_SPECIES_INFO,
            Self::Inchikey(n) => n,
        }
    }
}

/// One reaction labelling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionLayer {
    Smiles,
    RawId,
    Ec(u8),
}

impl ReactionLayer {
    pub fn info(self) -> u8 {
        match self {
            Self::Smiles | Self::RawId => MAX_REACTION_INFO,
            Self::Ec(n) => n,
        }
    }
}

/// Information carried by a comparison graph's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoWeight {
    pub species: u8,
    pub reaction: u8,
}

impl InfoWeight {
    pub fn new(species: u8, reaction: u8) -> Self {
        Self { species, reaction }
    }

    /// Mean information normalized by the finest available levels, in (0, 1].
    pub fn normalized(self) -> f64 {
        f64::from(self.species + self.reaction)
            / f64::from(MAX_SPECIES_INFO + MAX_REACTION_INFO)
    }
}

/// Leading `layers` dash-separated segments of an InChIKey.
pub fn truncate_inchikey(inchikey: &str, layers: u8) -> String {
    inchikey
        .split('-')
        .take(usize::from(layers))
        .collect::<Vec<_>>()
        .join("-")
}

/// Leading `layers` dot-separated segments of an EC number, wildcards dropped.
pub fn truncate_ec(ec_number: &str, layers: u8) -> String {
    ec_number
        .split('.')
        .take(usize::from(layers))
        .filter(|segment| *segment != "-")
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_levels() {
        assert_eq!(SpeciesSpecificity::try_from(0).unwrap(), SpeciesSpecificity::RawId);
        assert_eq!(
            SpeciesSpecificity::try_from(2).unwrap().layers(),
            vec![SpeciesLayer::Inchikey(3), SpeciesLayer::Inchikey(2)]
        );
        assert!(matches!(
            SpeciesSpecificity::try_from(4),
            Err(Error::InvalidAbstractionLevel { kind: "species", value: 4 })
        ));
        assert!(SpeciesSpecificity::try_from(-1).is_err());
    }

    #[test]
    fn test_reaction_levels() {
        assert_eq!(
            ReactionSpecificity::try_from(-1).unwrap().layers(),
            vec![ReactionLayer::Smiles]
        );
        assert_eq!(ReactionSpecificity::try_from(1).unwrap().layers().len(), 4);
        assert_eq!(ReactionSpecificity::try_from(4).unwrap().layers(), vec![ReactionLayer::Ec(4)]);
        assert!(ReactionSpecificity::try_from(5).is_err());
        assert!(ReactionSpecificity::try_from(-2).is_err());
    }

    #[test]
    fn test_layer_info() {
        assert_eq!(SpeciesLayer::RawId.info(), 3);
        assert_eq!(ReactionLayer::Smiles.info(), 4);
        assert_eq!(ReactionLayer::Ec(2).info(), 2);
        assert_eq!(InfoWeight::new(3, 4).normalized(), 1.0);
        assert!((InfoWeight::new(2, 3).normalized() - 5.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_truncate_inchikey() {
        let key = "XLYOFNOQVPJJNP-UHFFFAOYSA-N";
        assert_eq!(truncate_inchikey(key, 3), key);
        assert_eq!(truncate_inchikey(key, 2), "XLYOFNOQVPJJNP-UHFFFAOYSA");
        assert_eq!(truncate_inchikey(key, 1), "XLYOFNOQVPJJNP");
    }

    #[test]
    fn test_truncate_ec_drops_wildcards() {
        assert_eq!(truncate_ec("1.2.3.4", 4), "1.2.3.4");
        assert_eq!(truncate_ec("1.2.3.4", 2), "1.2");
        assert_eq!(truncate_ec("4.2.1.-", 4), "4.2.1");
        assert_eq!(truncate_ec("4.-.-.-", 3), "4");
    }
}
