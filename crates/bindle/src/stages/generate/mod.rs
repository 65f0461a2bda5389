pub mod formats;
pub mod optimize_chunks;

use std::{
  path::{Path, PathBuf},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use arcstr::ArcStr;
use bindle_common::{
  ChunkIdx, FxIndexSet, NormalizedInputOptions, NormalizedOutputOptions, Output, OutputBundle,
  OutputChunk, OutputOptions, RenderedModule,
};
use bindle_error::{BuildError, BuildResult};
use bindle_sourcemap::SourceMap;
use bindle_utils::{
  commondir::commondir,
  option_ext::OptionExt,
  rayon::{IntoParallelIterator, ParallelIterator},
};
use futures::future::try_join_all;
use parking_lot::Mutex;
use sugar_path::SugarPath;

use crate::{
  graph::{ChunkGraph, Graph},
  types::bundle_output::BundleOutput,
  utils::{
    chunk::{
      cross_chunk_links::compute_cross_chunk_exports,
      determine_export_mode::determine_export_mode, pre_render::pre_render_chunk,
    },
    finalize_asset::finalize_asset,
    normalize_options::normalize_output,
  },
};

use self::formats::{render_chunk, ChunkRenderContext, ResolvedAddons};

/// One generate (or write) pass over the built chunk list: naming,
/// rendering, plugin finalization and bundle assembly. Repeated passes on
/// the same handle produce structurally equal bundles.
pub struct GenerateStage<'a> {
  options: &'a NormalizedInputOptions,
  graph: &'a Graph,
  chunk_graph: &'a mut ChunkGraph,
  /// Per-handle gate: the chunk post-optimizer fires for at most one
  /// generate call over the lifetime of the handle.
  optimized: &'a AtomicBool,
}

impl<'a> GenerateStage<'a> {
  pub fn new(
    options: &'a NormalizedInputOptions,
    graph: &'a Graph,
    chunk_graph: &'a mut ChunkGraph,
    optimized: &'a AtomicBool,
  ) -> Self {
    Self { options, graph, chunk_graph, optimized }
  }

  pub async fn generate(
    mut self,
    raw: OutputOptions,
    is_write: bool,
  ) -> BuildResult<(BundleOutput, NormalizedOutputOptions)> {
    let has_multiple_chunks =
      self.chunk_graph.chunks.iter().filter(|chunk| chunk.is_alive).count() > 1;
    let out = normalize_output(raw, self.options, has_multiple_chunks)?;

    let mut bundle = OutputBundle::default();
    let assets = Arc::new(Mutex::new(self.graph.asset_snapshot()));
    self
      .graph
      .finalize_assets(&mut assets.lock(), &out.asset_filenames, &mut bundle)
      .map_err(BuildError::from)?;

    let input_base = self.input_base();

    // Failures between render_start and the chunk renders surface to the
    // render_error hook before the original error is rethrown.
    if let Err(error) = self.render_chunks(&out, &input_base, &mut bundle).await {
      self.graph.driver.render_error(&error).await.map_err(BuildError::from)?;
      return Err(error);
    }

    // Asset emissions during generate_bundle are scoped to this call: the
    // hooks work against a snapshot of the store, never the build's copy.
    let scoped = self.graph.driver.context().scoped_to(Arc::clone(&assets));
    self
      .graph
      .driver
      .generate_bundle(&scoped, &out, &mut bundle, is_write)
      .await
      .map_err(BuildError::from)?;

    for (_, asset) in assets.lock().iter_mut() {
      if asset.filename.is_none() {
        finalize_asset(asset, &out.asset_filenames, &mut bundle).map_err(BuildError::from)?;
      }
    }

    Ok((finalize_bundle(bundle), out))
  }

  /// Steps guarded by the render_error hook: render_start, addon
  /// collection, export binding resolution, pre-render, the one-shot chunk
  /// optimizer, chunk naming, and the parallel chunk renders.
  async fn render_chunks(
    &mut self,
    out: &NormalizedOutputOptions,
    input_base: &Path,
    bundle: &mut OutputBundle,
  ) -> BuildResult<()> {
    let driver = &self.graph.driver;
    let modules = &self.graph.module_table;

    driver.render_start().await.map_err(BuildError::from)?;
    driver.warn_deprecated_hooks();
    let addons = resolve_addons(out, driver.addons().await.map_err(BuildError::from)?);

    self.resolve_export_modes(out).map_err(BuildError::from)?;
    self.pre_render_all();

    if self.options.optimize_chunks && !self.optimized.swap(true, Ordering::SeqCst) {
      optimize_chunks::optimize_chunks(
        self.chunk_graph,
        modules,
        self.options.chunk_grouping_size,
      );
      // Merged chunks invalidate the pre-rendered skeletons.
      self.pre_render_all();
    }

    self.assign_filenames(out, input_base, &addons);

    for chunk in self.chunk_graph.chunks.iter().filter(|chunk| chunk.is_alive) {
      let filename: ArcStr = chunk.filename.unpack_ref().clone();
      bundle.insert(
        filename.clone(),
        Output::Chunk(Box::new(OutputChunk {
          filename,
          is_entry: chunk.is_user_defined_entry(),
          facade_module_id: chunk.entry_module_idx().map(|idx| modules[idx].id.clone()),
          imports: vec![],
          exports: vec![],
          modules: Default::default(),
          code: String::new(),
          map: None,
        })),
      );
    }

    let warn = self.options.warn.clone();
    let warn = &warn;
    let addons = &addons;
    let chunk_graph = &*self.chunk_graph;
    let alive: Vec<ChunkIdx> = chunk_graph
      .chunks
      .indices()
      .filter(|idx| chunk_graph.chunks[*idx].is_alive)
      .collect();

    let rendered = try_join_all(alive.into_iter().map(|chunk_idx| async move {
      let chunk = &chunk_graph.chunks[chunk_idx];
      let ctx = ChunkRenderContext {
        chunk,
        chunk_graph,
        modules,
        options: out,
        addons,
        warn,
      };
      let (code, map) = render_chunk(&ctx)?;
      let entry = build_output_chunk(chunk_graph, modules, chunk_idx, code, map);
      driver.on_generate(&entry).await?;
      Ok::<_, anyhow::Error>(entry)
    }))
    .await
    .map_err(BuildError::from)?;

    for entry in rendered {
      bundle.insert(entry.filename.clone(), Output::Chunk(Box::new(entry)));
    }
    Ok(())
  }

  /// Longest common directory of the resolved entry module paths; empty
  /// when there are no entries.
  fn input_base(&self) -> PathBuf {
    let entry_paths: Vec<&std::path::Path> = self
      .graph
      .entry_points
      .iter()
      .filter(|entry| entry.kind.is_user_defined())
      .map(|entry| self.graph.module_table[entry.id].id.as_path())
      .collect();
    commondir(&entry_paths)
  }

  fn resolve_export_modes(&mut self, out: &NormalizedOutputOptions) -> anyhow::Result<()> {
    for chunk in self.chunk_graph.chunks.iter_mut().filter(|chunk| chunk.is_alive) {
      if let Some(entry_idx) = chunk.entry_module_idx() {
        let entry = &self.graph.module_table[entry_idx];
        chunk.export_mode =
          determine_export_mode(&self.options.warn, &entry.id, &entry.exports, out)?;
      }
    }
    Ok(())
  }

  fn pre_render_all(&mut self) {
    let needed_exports = compute_cross_chunk_exports(self.chunk_graph, &self.graph.module_table);
    let alive: Vec<ChunkIdx> = self
      .chunk_graph
      .chunks
      .indices()
      .filter(|idx| self.chunk_graph.chunks[*idx].is_alive)
      .collect();
    let chunk_graph = &*self.chunk_graph;
    let modules = &self.graph.module_table;
    let pre_rendered: Vec<(ChunkIdx, _)> = alive
      .into_par_iter()
      .map(|idx| (idx, pre_render_chunk(idx, chunk_graph, modules, &needed_exports)))
      .collect();
    for (idx, pre) in pre_rendered {
      self.chunk_graph.chunks[idx].pre_rendered = Some(pre);
    }
  }

  /// Chunk naming with collision avoidance: a single `file` names the one
  /// chunk directly, `preserve_modules` derives per-module paths, everything
  /// else renders the entry or chunk pattern with `[hash]` fed from the
  /// chunk skeleton, the addons and the format tag.
  fn assign_filenames(
    &mut self,
    out: &NormalizedOutputOptions,
    input_base: &Path,
    addons: &ResolvedAddons,
  ) {
    let modules = &self.graph.module_table;
    let mut used_ids: FxIndexSet<ArcStr> = FxIndexSet::default();

    for chunk in self.chunk_graph.chunks.iter_mut().filter(|chunk| chunk.is_alive) {
      let id = if self.options.preserve_modules && out.file.is_none() {
        chunk.generate_id_preserve_modules(input_base, modules)
      } else {
        chunk.name = Some(chunk.generate_name(modules));
        let hash_input = format!(
          "{}\u{0}{:?}{:?}{:?}{:?}\u{0}{}",
          chunk.pre_rendered.unpack_ref().body(),
          addons.banner,
          addons.footer,
          addons.intro,
          addons.outro,
          out.format
        );
        chunk.generate_id(out, &hash_input, &used_ids)
      };
      used_ids.insert(id.clone());
      chunk.filename = Some(id);
    }
  }

}

fn build_output_chunk(
  chunk_graph: &ChunkGraph,
  modules: &bindle_common::ModuleTable,
  chunk_idx: ChunkIdx,
  code: String,
  map: Option<SourceMap>,
) -> OutputChunk {
  let chunk = &chunk_graph.chunks[chunk_idx];
  let pre = chunk.pre_rendered.unpack_ref();

  let mut imports: Vec<ArcStr> =
    pre.imports_from_external.iter().map(|(specifier, _)| specifier.clone()).collect();
  imports.extend(
    pre
      .imports_from_chunks
      .iter()
      .map(|(idx, _)| chunk_graph.chunks[*idx].filename.unpack_ref().clone()),
  );

  let rendered_modules = pre
    .sources
    .iter()
    .map(|(module_idx, body)| {
      let module = &modules[*module_idx];
      (
        module.id.clone(),
        RenderedModule {
          original_length: module.original_code.len(),
          rendered_length: body.len(),
          exec_order: module.exec_order,
        },
      )
    })
    .collect();

  OutputChunk {
    filename: chunk.filename.unpack_ref().clone(),
    is_entry: chunk.is_user_defined_entry(),
    facade_module_id: chunk.entry_module_idx().map(|idx| modules[idx].id.clone()),
    imports,
    exports: pre.exports.iter().map(|export| export.exported.clone()).collect(),
    modules: rendered_modules,
    code,
    map,
  }
}

fn resolve_addons(
  out: &NormalizedOutputOptions,
  plugin_addons: bindle_plugin::PluginAddons,
) -> ResolvedAddons {
  let merge = |configured: Option<&String>, contributed: Vec<String>| {
    let parts: Vec<String> =
      configured.cloned().into_iter().chain(contributed).filter(|part| !part.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
  };
  ResolvedAddons {
    banner: merge(out.banner.as_ref(), plugin_addons.banner),
    footer: merge(out.footer.as_ref(), plugin_addons.footer),
    intro: merge(out.intro.as_ref(), plugin_addons.intro),
    outro: merge(out.outro.as_ref(), plugin_addons.outro),
  }
}

/// Entry chunks first, then shared chunks, then assets; insertion order is
/// preserved within each class.
fn finalize_bundle(bundle: OutputBundle) -> BundleOutput {
  let mut assets: Vec<Output> = bundle.into_values().collect();
  assets.sort_by_key(|output| match output {
    Output::Chunk(chunk) if chunk.is_entry => 0u8,
    Output::Chunk(_) => 1,
    Output::Asset(_) => 2,
  });
  BundleOutput { assets }
}

