use std::{
  sync::{atomic::AtomicBool, Arc},
  time::Duration,
};

use arcstr::ArcStr;
use bindle_common::{BuildCache, BuildWatcher, FxIndexSet, InputOptions, OutputOptions};
use bindle_error::{BuildError, BuildResult, Diagnostic};
use bindle_plugin::SharedPlugin;

use crate::{
  graph::{ChunkGraph, Graph},
  stages::{generate::GenerateStage, write::write_bundle},
  types::{bundle_output::BundleOutput, SharedOptions},
  utils::{
    normalize_options::{normalize_input, NormalizeInputReturn},
    timings::Timings,
  },
};

/// Builds a bundle handle. Plugins ride beside the options; `None` slots in
/// the plugin list are dropped silently, so callers can toggle plugins with
/// plain conditionals. The watcher is an explicit argument rather than
/// ambient state and is consumed by exactly one build.
#[derive(Default)]
pub struct BundlerBuilder {
  options: Option<InputOptions>,
  plugins: Vec<Option<SharedPlugin>>,
  watcher: Option<Arc<dyn BuildWatcher>>,
}

impl BundlerBuilder {
  #[must_use]
  pub fn with_options(mut self, options: InputOptions) -> Self {
    self.options = Some(options);
    self
  }

  #[must_use]
  pub fn with_plugins(mut self, plugins: Vec<Option<SharedPlugin>>) -> Self {
    self.plugins = plugins;
    self
  }

  #[must_use]
  pub fn with_watcher(mut self, watcher: Arc<dyn BuildWatcher>) -> Self {
    self.watcher = Some(watcher);
    self
  }

  /// Runs the one-shot build phase and returns the handle for generate and
  /// write calls.
  pub async fn bundle(self) -> BuildResult<Bundler> {
    Bundler::build(self.options, self.plugins, self.watcher).await
  }
}

/// Top-level convenience entry for a plain options object.
pub async fn bundle(options: InputOptions) -> BuildResult<Bundler> {
  BundlerBuilder::default().with_options(options).bundle().await
}

/// The caller-facing handle of one build: cached metadata plus repeatable
/// `generate` and `write`.
pub struct Bundler {
  options: SharedOptions,
  graph: Graph,
  chunk_graph: ChunkGraph,
  cache: Option<BuildCache>,
  /// Gates chunk post-optimization to a single firing per handle.
  optimized: AtomicBool,
  timings: Timings,
}

impl std::fmt::Debug for Bundler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Bundler")
      .field("chunk_graph", &self.chunk_graph)
      .field("cache", &self.cache)
      .field("optimized", &self.optimized)
      .field("timings", &self.timings)
      .finish_non_exhaustive()
  }
}

impl Bundler {
  async fn build(
    raw_options: Option<InputOptions>,
    plugins: Vec<Option<SharedPlugin>>,
    watcher: Option<Arc<dyn BuildWatcher>>,
  ) -> BuildResult<Self> {
    let plugins: Vec<SharedPlugin> = plugins.into_iter().flatten().collect();

    let NormalizeInputReturn { options, cache } = normalize_input(raw_options, &plugins).await?;
    let cache_enabled = !cache.is_disabled();
    let options: SharedOptions = Arc::new(options);

    let mut timings = Timings::new(options.perf);
    timings.start("build");

    let mut graph = Graph::new(Arc::clone(&options), plugins, watcher, cache);

    graph.driver.build_start().await.map_err(BuildError::from)?;

    let build_result = graph.build().await;
    // build_end observes success and failure alike; its own failure shadows
    // the build error.
    let build_error = build_result.as_ref().err();
    graph.driver.build_end(build_error).await.map_err(BuildError::from)?;
    let chunk_graph = build_result?;

    timings.end("build");
    tracing::info!(chunks = chunk_graph.chunks.len(), "build finished");

    let cache = cache_enabled.then(|| graph.cache());

    Ok(Self {
      options,
      graph,
      chunk_graph,
      cache,
      optimized: AtomicBool::new(false),
      timings,
    })
  }

  /// Assembles a fresh output bundle for this configuration. Repeatable;
  /// every call produces an independent bundle.
  pub async fn generate(&mut self, output_options: OutputOptions) -> BuildResult<BundleOutput> {
    self.timings.start("generate");
    let result = GenerateStage::new(
      &self.options,
      &self.graph,
      &mut self.chunk_graph,
      &self.optimized,
    )
    .generate(output_options, false)
    .await;
    self.timings.end("generate");
    result.map(|(output, _)| output)
  }

  /// Generates and persists the bundle. Requires a `file` or `dir` sink.
  pub async fn write(&mut self, output_options: OutputOptions) -> BuildResult<BundleOutput> {
    let merged = output_options.clone().merged_over(&self.options.output);
    if merged.file.is_none() && merged.dir.is_none() {
      return Err(Diagnostic::new("You must specify output.file").into());
    }

    self.timings.start("generate");
    let result = GenerateStage::new(
      &self.options,
      &self.graph,
      &mut self.chunk_graph,
      &self.optimized,
    )
    .generate(output_options, true)
    .await;
    self.timings.end("generate");
    let (output, out) = result?;

    self.timings.start("write");
    write_bundle(&out, &self.options.cwd, &output, &self.graph.driver).await?;
    self.timings.end("write");

    Ok(output)
  }

  /// The build cache, unless the caller disabled caching.
  pub fn cache(&self) -> Option<&BuildCache> {
    self.cache.as_ref()
  }

  /// Every module path the build touched, for file watchers.
  pub fn watch_files(&self) -> &FxIndexSet<ArcStr> {
    &self.graph.watch_files
  }

  /// Recorded phase durations; present when the build ran with `perf`.
  pub fn timings(&self) -> Option<Vec<(String, Duration)>> {
    self.timings.snapshot()
  }
}
