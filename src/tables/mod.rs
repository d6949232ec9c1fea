//! Compression tables: the term vocabulary, the well-known context registry, and the
//! per-type literal tables. All of them are built once per transform session.

pub mod context_registry;
pub mod type_table;
pub mod vocab;

pub use self::context_registry::{ContextRegistry, APP_CONTEXT_START};
pub use self::type_table::{LiteralTable, TypeTable};
pub use self::vocab::Vocabulary;
