use arcstr::ArcStr;
use bindle_sourcemap::SourceMap;

use crate::{FxIndexMap, ModuleId, RenderedModule};

pub struct OutputChunk {
  pub filename: ArcStr,
  pub is_entry: bool,
  pub facade_module_id: Option<ModuleId>,
  pub imports: Vec<ArcStr>,
  pub exports: Vec<String>,
  pub modules: FxIndexMap<ModuleId, RenderedModule>,
  pub code: String,
  pub map: Option<SourceMap>,
}

impl OutputChunk {
  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    self.code.as_bytes()
  }
}

impl std::fmt::Debug for OutputChunk {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OutputChunk")
      .field("filename", &self.filename)
      .field("is_entry", &self.is_entry)
      .field("imports", &self.imports)
      .field("exports", &self.exports)
      .field("map", &self.map.as_ref().map(|_| "SourceMap"))
      .finish_non_exhaustive()
  }
}
