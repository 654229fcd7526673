//! rpgraph Core: errors, configuration, typed annotations, data providers.

pub mod annotation;
pub mod config;
pub mod error;
pub mod provider;

pub use annotation::{MiriamAnnotation, SecondaryAnnotation};
pub use config::{AssignmentStrategy, EditCosts, LabelPolicy, RpGraphConfig};
pub use error::{Error, Result};
pub use provider::{
    MemoryProvider, Participant, PathwayDataProvider, PathwayRecord, ReactionParticipants,
    ReactionRecord, SpeciesRecord,
};
