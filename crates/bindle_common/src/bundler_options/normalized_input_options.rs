use std::path::PathBuf;

use bindle_error::WarningHandler;

use crate::{InputItem, ManualChunksFn, OutputOptions};

/// Input configuration after normalization, immutable for the rest of the
/// build. The cache request is split off during normalization so the graph
/// can drop the warm modules once they have been consumed.
pub struct NormalizedInputOptions {
  pub input: Vec<InputItem>,
  pub cwd: PathBuf,
  pub preserve_modules: bool,
  pub inline_dynamic_imports: bool,
  pub manual_chunks: Option<ManualChunksFn>,
  pub optimize_chunks: bool,
  pub chunk_grouping_size: usize,
  /// Composed sink: routes to the caller-supplied handler with the default
  /// handler as fallthrough, or straight to the default.
  pub warn: WarningHandler,
  pub perf: bool,
  pub output: OutputOptions,
}

impl NormalizedInputOptions {
  pub fn has_named_input(&self) -> bool {
    self.input.iter().any(|item| item.name.is_some())
  }
}

impl std::fmt::Debug for NormalizedInputOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NormalizedInputOptions")
      .field("input", &self.input)
      .field("cwd", &self.cwd)
      .field("preserve_modules", &self.preserve_modules)
      .field("inline_dynamic_imports", &self.inline_dynamic_imports)
      .field("optimize_chunks", &self.optimize_chunks)
      .field("chunk_grouping_size", &self.chunk_grouping_size)
      .field("perf", &self.perf)
      .finish_non_exhaustive()
  }
}
