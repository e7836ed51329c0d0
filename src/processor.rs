//! Per-resource processing: read, compress, encode, write.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::ProcessError;
use crate::layout::OutputLayout;
use crate::sanitize::sanitize;
use crate::utils::write_whole_file;

/// Result of processing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResource {
    /// Generated module path
    pub path: PathBuf,
    /// Size of the source file
    pub bytes_in: usize,
    /// Length of the encoded payload
    pub encoded_len: usize,
}

/// Turns resource files into generated modules.
#[derive(Debug, Clone)]
pub struct ResourceProcessor {
    layout: OutputLayout,
    compression: bool,
}

impl ResourceProcessor {
    pub fn new(layout: OutputLayout, compression: bool) -> Self {
        Self {
            layout,
            compression,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    /// Render the body of a per-resource module.
    pub fn render_module(payload: &str) -> String {
        format!("export default \"{payload}\"")
    }

    /// Process one resource.
    ///
    /// The output file is only touched once the payload is fully encoded, so
    /// a failed read leaves any previous artifact in place.
    pub async fn process(
        &self,
        name: &str,
        source: &Path,
    ) -> Result<ProcessedResource, ProcessError> {
        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| ProcessError::Read {
                path: source.to_path_buf(),
                source: e,
            })?;

        let payload =
            codec::encode_payload(&bytes, self.compression).map_err(ProcessError::Compress)?;

        let path = self.layout.module_path(&sanitize(name));
        write_whole_file(&path, &Self::render_module(&payload))
            .await
            .map_err(|e| ProcessError::Write {
                path: path.clone(),
                source: e,
            })?;

        Ok(ProcessedResource {
            path,
            bytes_in: bytes.len(),
            encoded_len: payload.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload_of(module: &str) -> &str {
        module
            .strip_prefix("export default \"")
            .and_then(|s| s.strip_suffix('"'))
            .expect("module has a single default export")
    }

    #[tokio::test]
    async fn test_process_writes_module() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.bin");
        std::fs::write(&source, [0u8, 1, 2, 255]).unwrap();

        let layout = OutputLayout::new(temp_dir.path().join("reve"), "ts");
        let processor = ResourceProcessor::new(layout, false);

        let processed = processor.process("a b", &source).await.unwrap();
        assert_eq!(processed.path, temp_dir.path().join("reve/source/a_b.ts"));
        assert_eq!(processed.bytes_in, 4);

        let module = std::fs::read_to_string(&processed.path).unwrap();
        assert_eq!(module, "export default \"AAEC/w==\"");
        assert_eq!(processed.encoded_len, payload_of(&module).len());
    }

    #[tokio::test]
    async fn test_process_compressed_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("data.txt");
        let content = b"hello hello hello hello hello".repeat(20);
        std::fs::write(&source, &content).unwrap();

        let layout = OutputLayout::new(temp_dir.path().join("reve"), "ts");
        let processor = ResourceProcessor::new(layout, true);
        let processed = processor.process("data", &source).await.unwrap();

        let module = std::fs::read_to_string(&processed.path).unwrap();
        let decoded = codec::decode_payload(payload_of(&module), true).unwrap();
        assert_eq!(decoded, content);
    }

    #[tokio::test]
    async fn test_missing_source_keeps_previous_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(temp_dir.path().join("reve"), "ts");
        let existing = layout.module_path("gone");
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, "export default \"b2xk\"").unwrap();

        let processor = ResourceProcessor::new(layout, false);
        let err = processor
            .process("gone", &temp_dir.path().join("missing.bin"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::Read { .. }));
        assert_eq!(
            std::fs::read_to_string(&existing).unwrap(),
            "export default \"b2xk\""
        );
    }
}
