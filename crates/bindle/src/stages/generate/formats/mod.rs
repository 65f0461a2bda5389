pub mod amd;
pub mod cjs;
pub mod esm;
pub mod iife;
pub mod system;
pub mod umd;

use std::path::Path;

use bindle_common::{
  Chunk, ChunkIdx, ImportedName, ModuleTable, NormalizedOutputOptions, OutputExports,
  OutputFormat, PreRenderedChunk,
};
use bindle_error::{codes, Warning, WarningHandler};
use bindle_sourcemap::{SourceJoiner, SourceMap, SourceMapSource};
use bindle_utils::option_ext::OptionExt;

use crate::{graph::ChunkGraph, utils::chunk::pre_render::dynamic_import_placeholder};

/// Banner/footer/intro/outro already merged from the output options and the
/// plugin contributions.
#[derive(Debug, Default, Clone)]
pub struct ResolvedAddons {
  pub banner: Option<String>,
  pub footer: Option<String>,
  pub intro: Option<String>,
  pub outro: Option<String>,
}

pub struct ChunkRenderContext<'a> {
  pub chunk: &'a Chunk,
  pub chunk_graph: &'a ChunkGraph,
  pub modules: &'a ModuleTable,
  pub options: &'a NormalizedOutputOptions,
  pub addons: &'a ResolvedAddons,
  pub warn: &'a WarningHandler,
}

impl ChunkRenderContext<'_> {
  pub fn pre_rendered(&self) -> &PreRenderedChunk {
    self.chunk.pre_rendered.unpack_ref()
  }

  pub fn filename(&self) -> &str {
    self.chunk.filename.unpack_ref()
  }

  fn filename_of(&self, chunk_idx: ChunkIdx) -> &str {
    self.chunk_graph.chunks[chunk_idx].filename.unpack_ref()
  }

  pub fn import_path_of(&self, chunk_idx: ChunkIdx) -> String {
    relative_import_path(self.filename(), self.filename_of(chunk_idx))
  }

  /// Module bodies with dynamic-import markers resolved to relative chunk
  /// paths, each carrying its origin for the output map.
  pub fn module_sources(&self) -> Vec<SourceMapSource> {
    let pre = self.pre_rendered();
    pre
      .sources
      .iter()
      .map(|(module_idx, body)| {
        let mut body = body.clone();
        for target in &pre.dynamic_imports {
          body = body
            .replace(&dynamic_import_placeholder(*target), &self.import_path_of(*target));
        }
        SourceMapSource::new(body, self.modules[*module_idx].id.to_string())
      })
      .collect()
  }

  /// The export mode of this chunk: entry chunks follow the resolved
  /// `output.exports`, shared chunks always use named bindings.
  pub fn export_mode(&self) -> OutputExports {
    if self.chunk.entry_module_idx().is_some() {
      self.chunk.export_mode
    } else {
      OutputExports::Named
    }
  }

  /// The binding holding the entry's default export, for `default` mode
  /// wrappers.
  pub fn default_export_local(&self) -> Option<&str> {
    self
      .pre_rendered()
      .exports
      .iter()
      .find(|export| export.exported == "default")
      .map(|export| export.local.as_str())
  }

  /// Global variable for an external dependency of an iife/umd bundle,
  /// guessed (with a warning) when the globals map has no entry.
  pub fn global_name(&self, specifier: &str) -> String {
    if let Some(name) = self.options.globals.get(specifier) {
      return name.clone();
    }
    let guess = identifier_for(specifier);
    (self.warn)(
      Warning::new(format!(
        "No name was provided for external module '{specifier}' in output.globals - guessing '{guess}'"
      ))
      .with_code(codes::MISSING_GLOBAL_NAME),
    );
    guess
  }
}

/// Renders one chunk in the configured output format, producing its code
/// and, when requested, a line-accurate source map. Rendered chunks always
/// end in a newline.
pub fn render_chunk(ctx: &ChunkRenderContext) -> anyhow::Result<(String, Option<SourceMap>)> {
  let joiner = match ctx.options.format {
    OutputFormat::Esm => esm::render(ctx)?,
    OutputFormat::Cjs => cjs::render(ctx)?,
    OutputFormat::Amd => amd::render(ctx)?,
    OutputFormat::Iife => iife::render(ctx)?,
    OutputFormat::Umd => umd::render(ctx)?,
    OutputFormat::System => system::render(ctx)?,
  };

  let (mut code, map) = if ctx.options.sourcemap.is_enabled() {
    let file =
      ctx.options.sourcemap_file.as_deref().map_or_else(|| ctx.filename().to_string(), |file| {
        Path::new(file).file_name().unwrap_or_default().to_string_lossy().into_owned()
      });
    let (code, map) = joiner.join_with_sourcemap(&file);
    (code, Some(map))
  } else {
    (joiner.join(), None)
  };

  if !code.ends_with('\n') {
    code.push('\n');
  }
  Ok((code, map))
}

/// Relative path between two files of the output directory, usable as an
/// import specifier.
pub fn relative_import_path(from: &str, to: &str) -> String {
  let from_components: Vec<&str> = from.split('/').collect();
  let to_components: Vec<&str> = to.split('/').collect();
  let from_dir = &from_components[..from_components.len() - 1];

  let shared = from_dir
    .iter()
    .zip(to_components.iter())
    .take_while(|(a, b)| a == b)
    .count();

  let mut path = String::new();
  for _ in shared..from_dir.len() {
    path.push_str("../");
  }
  if path.is_empty() {
    path.push_str("./");
  }
  path.push_str(&to_components[shared..].join("/"));
  path
}

/// A legal identifier derived from an external specifier.
pub fn identifier_for(specifier: &str) -> String {
  let base = specifier.rsplit('/').next().unwrap_or(specifier);
  let base = base.strip_suffix(".js").unwrap_or(base);
  let sanitized: String = base
    .chars()
    .map(|char| if char.is_ascii_alphanumeric() || char == '_' { char } else { '_' })
    .collect();
  if sanitized.chars().next().is_some_and(|first| first.is_ascii_digit()) {
    format!("_{sanitized}")
  } else {
    sanitized
  }
}

/// Distinct factory parameter name for the dependency at `index`.
pub fn dependency_param(index: usize, specifier: &str) -> String {
  format!("{}${index}", identifier_for(specifier))
}

/// `var local = param;` / `var local = param.binding;` lines that unpack an
/// injected dependency object into the locals the module bodies reference.
pub fn unpack_dependency(joiner: &mut SourceJoiner<'static>, param: &str, names: &[ImportedName]) {
  for name in names {
    if name.imported == "*" || name.imported == "default" {
      joiner.append_source(format!("var {} = {param};", name.local));
    } else {
      joiner.append_source(format!("var {} = {param}.{};", name.local, name.imported));
    }
  }
}

pub fn append_banner_and_intro(joiner: &mut SourceJoiner<'static>, addons: &ResolvedAddons) {
  if let Some(banner) = &addons.banner {
    joiner.append_source(banner.clone());
  }
  if let Some(intro) = &addons.intro {
    joiner.append_source(intro.clone());
  }
}

pub fn append_outro_and_footer(joiner: &mut SourceJoiner<'static>, addons: &ResolvedAddons) {
  if let Some(outro) = &addons.outro {
    joiner.append_source(outro.clone());
  }
  if let Some(footer) = &addons.footer {
    joiner.append_source(footer.clone());
  }
}

#[cfg(test)]
mod tests {
  use super::{identifier_for, relative_import_path};

  #[test]
  fn relative_paths_between_output_files() {
    assert_eq!(relative_import_path("main.js", "chunk-abc.js"), "./chunk-abc.js");
    assert_eq!(relative_import_path("nested/main.js", "chunk-abc.js"), "../chunk-abc.js");
    assert_eq!(relative_import_path("main.js", "nested/chunk.js"), "./nested/chunk.js");
  }

  #[test]
  fn identifier_guesses() {
    assert_eq!(identifier_for("lodash"), "lodash");
    assert_eq!(identifier_for("@scope/pkg"), "pkg");
    assert_eq!(identifier_for("d3-scale"), "d3_scale");
  }
}
