//! Footer metadata: schema descriptors, chunk locations and digests, and the
//! device index assembled at close.

mod chunk_metadata;
mod file_metadata;
mod row_group_metadata;
mod schema_descriptor;

pub use chunk_metadata::{ChunkMetadata, TsDigest};
pub use file_metadata::FileMetadata;
pub use row_group_metadata::RowGroupMetadata;
pub use schema_descriptor::{Schema, SensorDescriptor};
