use std::path::Path;

use arcstr::ArcStr;
use bindle_utils::{bitset::BitSet, hash::short_hash, path_ext::ModulePathExt};
use sugar_path::SugarPath;

use crate::{
  FileNameRenderOptions, FxIndexSet, ModuleIdx, ModuleTable, NormalizedOutputOptions,
  OutputExports, PreRenderedChunk,
};

pub const HASH_LEN: usize = 8;

#[derive(Debug, Default)]
pub enum ChunkKind {
  EntryPoint { is_user_defined: bool, bit: u32, module: ModuleIdx },
  #[default]
  Common,
}

#[derive(Debug, Default)]
pub struct Chunk {
  pub kind: ChunkKind,
  pub modules: Vec<ModuleIdx>,
  pub name: Option<ArcStr>,
  pub bits: BitSet,
  /// Final file name, assigned by the generate stage.
  pub filename: Option<ArcStr>,
  pub export_mode: OutputExports,
  pub pre_rendered: Option<PreRenderedChunk>,
  /// Cleared when the chunk optimizer folds this chunk into another.
  pub is_alive: bool,
}

impl Chunk {
  pub fn new(name: Option<ArcStr>, bits: BitSet, modules: Vec<ModuleIdx>, kind: ChunkKind) -> Self {
    Self { kind, modules, name, bits, is_alive: true, ..Self::default() }
  }

  pub fn entry_module_idx(&self) -> Option<ModuleIdx> {
    match &self.kind {
      ChunkKind::EntryPoint { module, .. } => Some(*module),
      ChunkKind::Common => None,
    }
  }

  pub fn is_user_defined_entry(&self) -> bool {
    matches!(self.kind, ChunkKind::EntryPoint { is_user_defined: true, .. })
  }

  /// Entry chunks, dynamic ones included, are named with the entry pattern;
  /// only shared chunks fall back to the hashed chunk pattern.
  pub fn filename_template<'a>(&self, options: &'a NormalizedOutputOptions) -> &'a str {
    match self.kind {
      ChunkKind::EntryPoint { .. } => options.entry_filenames.as_str(),
      ChunkKind::Common => options.chunk_filenames.as_str(),
    }
  }

  /// The `[name]` value of this chunk: the entry name or the entry module's
  /// file stem for entry chunks, `chunk` for shared ones.
  pub fn generate_name(&self, modules: &ModuleTable) -> ArcStr {
    if let Some(name) = &self.name {
      return name.clone();
    }
    match self.kind {
      ChunkKind::EntryPoint { module, .. } => {
        let module = &modules[module];
        ArcStr::from(sanitize_name(&module.id.as_path().module_stem()))
      }
      ChunkKind::Common => arcstr::literal!("chunk"),
    }
  }

  /// Renders the file name for this chunk against the entry or chunk
  /// pattern, avoiding collisions within `used_ids`. The caller inserts the
  /// returned id into `used_ids`.
  pub fn generate_id(
    &self,
    options: &NormalizedOutputOptions,
    hash_input: &str,
    used_ids: &FxIndexSet<ArcStr>,
  ) -> ArcStr {
    if let Some(file) = &options.file {
      let basename = Path::new(file.as_str())
        .file_name()
        .map_or_else(|| file.clone(), |name| name.to_string_lossy().into_owned());
      return ArcStr::from(basename);
    }

    let template = crate::FilenameTemplate::new(self.filename_template(options).to_string());
    let base_name = self.name.clone().unwrap_or(arcstr::literal!("chunk"));
    let hash =
      template.has_hash_pattern().then(|| short_hash(hash_input.as_bytes(), HASH_LEN));

    let mut candidate_name = base_name.to_string();
    let mut dedup_index = 1u32;
    loop {
      let rendered: ArcStr = template
        .render(&FileNameRenderOptions {
          name: Some(&candidate_name),
          hash: hash.as_deref(),
          ext: Some("js"),
        })
        .into();
      if !used_ids.contains(&rendered) {
        return rendered;
      }
      dedup_index += 1;
      candidate_name = format!("{base_name}{dedup_index}");
    }
  }

  /// One file per module: the module's path relative to the common entry
  /// directory, with the extension rewritten to `.js`.
  pub fn generate_id_preserve_modules(
    &self,
    input_base: &Path,
    modules: &ModuleTable,
  ) -> ArcStr {
    let module = &modules[self.modules[0]];
    let path = module.id.as_path();
    let relative = if path.is_absolute() && path.starts_with(input_base) {
      path.relative(input_base)
    } else {
      path.file_name().map(Into::into).unwrap_or_default()
    };
    ArcStr::from(relative.with_extension("js").to_slash_string())
  }
}

/// Chunk names land in file names, so everything outside the portable set
/// collapses to an underscore.
fn sanitize_name(raw: &str) -> String {
  raw
    .chars()
    .map(|char| if char.is_ascii_alphanumeric() || matches!(char, '-' | '_') { char } else { '_' })
    .collect()
}
