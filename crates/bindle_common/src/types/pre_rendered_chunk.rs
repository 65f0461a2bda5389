use arcstr::ArcStr;

use crate::{ChunkIdx, ExportItem, ImportedName, ModuleIdx};

/// The format-independent skeleton of a chunk: module bodies joined in
/// execution order plus the import/export surface the format wrappers need.
/// Produced by the pre-render pass, consumed by naming (hashing) and the
/// final render.
#[derive(Debug, Default)]
pub struct PreRenderedChunk {
  pub sources: Vec<(ModuleIdx, String)>,
  pub imports_from_external: Vec<(ArcStr, Vec<ImportedName>)>,
  pub imports_from_chunks: Vec<(ChunkIdx, Vec<ImportedName>)>,
  pub dynamic_imports: Vec<ChunkIdx>,
  pub exports: Vec<ExportItem>,
}

impl PreRenderedChunk {
  /// Joined module bodies, used as the content-hash input for `[hash]`
  /// substitution before the final wrapper is known.
  pub fn body(&self) -> String {
    let mut body = String::with_capacity(
      self.sources.iter().map(|(_, source)| source.len() + 1).sum::<usize>(),
    );
    for (_, source) in &self.sources {
      body.push_str(source);
      body.push('\n');
    }
    body
  }
}
