pub mod merge;
pub mod registry;
pub mod validate;

pub use merge::{merge_schema_files, MergedSchema};
pub use registry::{SchemaRegistry, DEFAULT_COLLECTION};
pub use validate::{validate_batch, CollectionBatch, CompiledSchema};
