pub mod filename_template;
pub mod from_json;
pub mod input_item;
pub mod normalized_input_options;
pub mod normalized_output_options;
pub mod output_exports;
pub mod output_format;
pub mod output_options;
pub mod source_map_option;

use std::{path::PathBuf, sync::Arc};

use bindle_error::{Warning, WarningHandler};

use crate::{CacheOption, InputItem, OutputOptions};

pub type ManualChunksFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Warning sink. The second argument is the default handler, so a caller may
/// opt into fallthrough behavior by invoking it.
pub type OnWarn = Arc<dyn Fn(Warning, &WarningHandler) + Send + Sync>;

#[derive(Default, Clone)]
pub struct InputOptions {
  // --- Input
  pub input: Vec<InputItem>,
  pub cwd: Option<PathBuf>,
  pub cache: CacheOption,

  // --- Chunking
  pub preserve_modules: bool,
  pub inline_dynamic_imports: bool,
  pub manual_chunks: Option<ManualChunksFn>,
  pub optimize_chunks: bool,
  pub chunk_grouping_size: Option<usize>,

  // --- Diagnostics
  pub on_warn: Option<OnWarn>,
  pub perf: bool,

  /// Defaults layered beneath each generate/write call.
  pub output: Option<OutputOptions>,

  /// Top-level keys a raw config carried that are not part of the option
  /// set. Each produces an `UNKNOWN_OPTION` warning during normalization.
  pub unknown_options: Vec<String>,
}

impl std::fmt::Debug for InputOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InputOptions")
      .field("input", &self.input)
      .field("cwd", &self.cwd)
      .field("preserve_modules", &self.preserve_modules)
      .field("inline_dynamic_imports", &self.inline_dynamic_imports)
      .field("manual_chunks", &self.manual_chunks.as_ref().map(|_| "Fn"))
      .field("optimize_chunks", &self.optimize_chunks)
      .field("chunk_grouping_size", &self.chunk_grouping_size)
      .field("perf", &self.perf)
      .field("output", &self.output)
      .field("unknown_options", &self.unknown_options)
      .finish_non_exhaustive()
  }
}
