/// Persistance des séquences : codec `ascii.txt`, métadonnées `meta.json`,
/// emplacement actif et store de rendus nommés.

pub mod artifacts;
pub mod codec;
pub mod meta;
pub mod store;

pub use artifacts::ArtifactSet;
pub use store::{SequenceStore, StoreError};
