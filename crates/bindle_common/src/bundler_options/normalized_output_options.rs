use rustc_hash::FxHashMap;

use crate::{OutputExports, OutputFormat, SourceMapOption};

/// Output configuration after normalization, defaults resolved.
#[derive(Debug, Clone)]
pub struct NormalizedOutputOptions {
  pub format: OutputFormat,
  pub file: Option<String>,
  pub dir: Option<String>,
  pub entry_filenames: String,
  pub chunk_filenames: String,
  pub asset_filenames: String,
  pub sourcemap: SourceMapOption,
  pub sourcemap_file: Option<String>,
  pub globals: FxHashMap<String, String>,
  pub name: Option<String>,
  pub exports: OutputExports,
  pub banner: Option<String>,
  pub footer: Option<String>,
  pub intro: Option<String>,
  pub outro: Option<String>,
  pub extend: bool,
  pub amd_id: Option<String>,
}
