//! JSON-LD context handling: fetching context documents, and tracking which term definitions are
//! in effect at each point of a document.
//!
//! Loading is split from resolution. [`ContextCache::load_closure`] asynchronously fetches every
//! context a document could need. After that, a [`Resolver`] applies contexts to a
//! [`ContextStack`] synchronously as the document is walked, following the JSON-LD scoping rules:
//! property-scoped contexts, node contexts, type-scoped contexts, `@propagate`, and `null` resets.

mod active;
mod definition;
mod loader;
mod resolver;
mod stack;

pub use self::active::{ActiveContext, Aliases};
pub use self::definition::{is_keyword, TermDefinition, TermInfo};
pub use self::loader::{ContextCache, DocumentLoader, StaticLoader};
pub use self::resolver::Resolver;
pub use self::stack::{Checkpoint, ContextStack};
