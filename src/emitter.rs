//! Aggregate index module rendering.
//!
//! The index maps every resource name to an expression that imports the
//! resource's generated module and decodes it, so consumers only ever import
//! one file.

use crate::config::CodegenConfig;
use crate::error::{BuildError, BuildResult};
use crate::layout::OutputLayout;
use crate::registry::ResourceRegistry;
use crate::utils::write_whole_file;

/// Decode primitive imported by the index module.
pub const DECODE_FN: &str = "decodeBase64";

/// Decompress primitive imported when compression is enabled.
pub const DECOMPRESS_FN: &str = "gunzip";

/// Renders and writes the index module.
#[derive(Debug, Clone)]
pub struct IndexEmitter {
    layout: OutputLayout,
    codegen: CodegenConfig,
    compression: bool,
}

fn string_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl IndexEmitter {
    pub fn new(layout: OutputLayout, codegen: CodegenConfig, compression: bool) -> Self {
        Self {
            layout,
            codegen,
            compression,
        }
    }

    /// Expression that loads and decodes one resource.
    fn entry_expr(&self, filename: &str) -> String {
        let specifier = string_literal(&self.layout.module_specifier(filename));
        let decoded = format!("{DECODE_FN}((await import({specifier})).default)");
        if self.compression {
            format!("{DECOMPRESS_FN}({decoded})")
        } else {
            decoded
        }
    }

    /// Render the index module for the registry's current resources.
    pub fn render_index(&self, registry: &ResourceRegistry) -> String {
        let mut out = format!(
            "import {{ {DECODE_FN} }} from {};\n",
            string_literal(&self.codegen.decode_import)
        );
        if self.compression {
            out.push_str(&format!(
                "import {{ {DECOMPRESS_FN} }} from {};\n",
                string_literal(&self.codegen.decompress_import)
            ));
        }
        out.push('\n');

        if registry.is_empty() {
            out.push_str("export default {}\n");
            return out;
        }

        out.push_str("export default {\n");
        for resource in registry.iter() {
            out.push_str(&format!(
                "  {}: {},\n",
                string_literal(resource.name),
                self.entry_expr(resource.filename)
            ));
        }
        out.push_str("}\n");
        out
    }

    /// Render and write the index module, replacing any previous one.
    pub async fn write_index(&self, registry: &ResourceRegistry) -> BuildResult<()> {
        let root = self.layout.root();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| BuildError::CreateDir {
                path: root.to_path_buf(),
                source: e,
            })?;

        let path = self.layout.index_path();
        let text = self.render_index(registry);
        write_whole_file(&path, &text)
            .await
            .map_err(|e| BuildError::WriteIndex {
                path: path.clone(),
                source: e,
            })?;

        crate::debug_event!("emit", "index written", "{}", path.display());
        Ok(())
    }
}
