use super::ChunkMetadata;

/// Writer-side record of one sealed row group: the device and its chunk
/// metadata in write order. Folded into the footer's device index at close.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupMetadata {
    device_id: String,
    chunks: Vec<ChunkMetadata>,
}

impl RowGroupMetadata {
    pub fn new(device_id: String, chunks: Vec<ChunkMetadata>) -> Self {
        Self { device_id, chunks }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn chunks(&self) -> &[ChunkMetadata] {
        &self.chunks
    }

    pub fn into_parts(self) -> (String, Vec<ChunkMetadata>) {
        (self.device_id, self.chunks)
    }
}
