//! Template Registry.
//!
//! Categorized pools of hooks, emotional triggers, pain amplifiers,
//! authority markers, CTAs, disclosures, and hashtag bases. Selection is
//! weighted, seeded, and suppresses the last few picks per pool so repeated
//! generations do not sound alike. Templates are data: placeholders of the
//! form `{NAME}`, never logic.

pub mod corpus;
pub mod file;
pub mod placeholder;
pub mod registry;

pub use file::CorpusFile;
pub use placeholder::instantiate;
pub use registry::{PoolKind, RegistryError, TemplateEntry, TemplateRegistry};
