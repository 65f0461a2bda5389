use rustc_hash::FxHashMap;

use crate::{OutputExports, SourceMapOption};

/// Raw per-call output configuration. `format` stays a string until
/// normalization so deprecated tags can be rejected with a precise message.
#[derive(Debug, Default, Clone)]
pub struct OutputOptions {
  pub format: Option<String>,
  pub file: Option<String>,
  pub dir: Option<String>,
  pub entry_filenames: Option<String>,
  pub chunk_filenames: Option<String>,
  pub asset_filenames: Option<String>,
  pub sourcemap: Option<SourceMapOption>,
  pub sourcemap_file: Option<String>,
  pub globals: FxHashMap<String, String>,
  pub name: Option<String>,
  pub exports: Option<OutputExports>,
  pub banner: Option<String>,
  pub footer: Option<String>,
  pub intro: Option<String>,
  pub outro: Option<String>,
  pub extend: bool,
  pub amd_id: Option<String>,
}

impl OutputOptions {
  /// Layers `defaults` (the input-level `output` field) beneath `self`.
  #[must_use]
  pub fn merged_over(self, defaults: &OutputOptions) -> OutputOptions {
    OutputOptions {
      format: self.format.or_else(|| defaults.format.clone()),
      file: self.file.or_else(|| defaults.file.clone()),
      dir: self.dir.or_else(|| defaults.dir.clone()),
      entry_filenames: self.entry_filenames.or_else(|| defaults.entry_filenames.clone()),
      chunk_filenames: self.chunk_filenames.or_else(|| defaults.chunk_filenames.clone()),
      asset_filenames: self.asset_filenames.or_else(|| defaults.asset_filenames.clone()),
      sourcemap: self.sourcemap.or(defaults.sourcemap),
      sourcemap_file: self.sourcemap_file.or_else(|| defaults.sourcemap_file.clone()),
      globals: if self.globals.is_empty() { defaults.globals.clone() } else { self.globals },
      name: self.name.or_else(|| defaults.name.clone()),
      exports: self.exports.or(defaults.exports),
      banner: self.banner.or_else(|| defaults.banner.clone()),
      footer: self.footer.or_else(|| defaults.footer.clone()),
      intro: self.intro.or_else(|| defaults.intro.clone()),
      outro: self.outro.or_else(|| defaults.outro.clone()),
      extend: self.extend || defaults.extend,
      amd_id: self.amd_id.or_else(|| defaults.amd_id.clone()),
    }
  }
}
