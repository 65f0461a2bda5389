use std::sync::Arc;

use arcstr::ArcStr;
use bindle_common::{
  AssetStore, BuildCache, BuildWatcher, CacheOption, CachedModule, Chunk, ChunkIdx, ChunkKind,
  EntryPoint, FxIndexSet, ModuleIdx, ModuleTable, OutputBundle, ResolvedImport,
};
use bindle_error::BuildResult;
use bindle_fs::OsFileSystem;
use bindle_plugin::{PluginContext, PluginDriver, SharedPlugin};
use bindle_utils::bitset::BitSet;
use oxc_index::IndexVec;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{
  module_loader::ModuleLoader, types::SharedOptions, utils::finalize_asset::finalize_asset,
};

/// The chunk list produced by one build, plus the module-to-chunk placement
/// the renderers need to route cross-chunk imports.
#[derive(Debug, Default)]
pub struct ChunkGraph {
  pub chunks: IndexVec<ChunkIdx, Chunk>,
  pub module_to_chunk: IndexVec<ModuleIdx, Option<ChunkIdx>>,
}

/// Owns the module table, the plugin driver and the emitted-asset store.
/// Built once per bundle call; every generate call reads it.
pub struct Graph {
  pub driver: PluginDriver,
  pub module_table: ModuleTable,
  pub entry_points: Vec<EntryPoint>,
  pub watch_files: FxIndexSet<ArcStr>,
  pub assets: Arc<Mutex<AssetStore>>,
  options: SharedOptions,
  fs: OsFileSystem,
  /// Handed over by the caller, consumed by exactly one build.
  watcher: Option<Arc<dyn BuildWatcher>>,
  /// Modules of a previous build; dropped once the build has consumed them.
  warm_cache: CacheOption,
}

impl Graph {
  pub fn new(
    options: SharedOptions,
    plugins: Vec<SharedPlugin>,
    watcher: Option<Arc<dyn BuildWatcher>>,
    warm_cache: CacheOption,
  ) -> Self {
    let assets = Arc::new(Mutex::new(AssetStore::default()));
    let context = PluginContext::new(Arc::clone(&assets), options.warn.clone());
    Self {
      driver: PluginDriver::new(plugins, context),
      module_table: ModuleTable::default(),
      entry_points: Vec::new(),
      watch_files: FxIndexSet::default(),
      assets,
      options,
      fs: OsFileSystem,
      watcher,
      warm_cache,
    }
  }

  pub async fn build(&mut self) -> BuildResult<ChunkGraph> {
    let watcher = self.watcher.take();
    let loader =
      ModuleLoader::new(self.fs, &self.options, &self.warm_cache, &self.driver, watcher);
    let result = loader.fetch_all_modules().await;
    self.warm_cache = CacheOption::Default;
    let output = result?;

    self.module_table = output.module_table;
    self.entry_points = output.entry_points;
    self.watch_files = output.watch_files;

    tracing::debug!(
      modules = self.module_table.len(),
      entries = self.entry_points.len(),
      "module graph built"
    );

    Ok(self.partition_chunks())
  }

  /// A per-generate working copy of the asset store. File names are cleared
  /// because every output configuration names assets against its own
  /// pattern.
  pub fn asset_snapshot(&self) -> AssetStore {
    let mut snapshot = self.assets.lock().clone();
    for (_, asset) in snapshot.iter_mut() {
      asset.filename = None;
    }
    snapshot
  }

  /// Finalizes every standing asset that already has a source into the
  /// fresh bundle. Sourceless assets stay pending; they must be completed
  /// before the end of the generate call.
  pub fn finalize_assets(
    &self,
    snapshot: &mut AssetStore,
    asset_filenames: &str,
    bundle: &mut OutputBundle,
  ) -> anyhow::Result<()> {
    for (_, asset) in snapshot.iter_mut() {
      if asset.source.is_some() {
        finalize_asset(asset, asset_filenames, bundle)?;
      }
    }
    Ok(())
  }

  pub fn cache(&self) -> BuildCache {
    BuildCache {
      modules: self
        .module_table
        .iter()
        .map(|module| CachedModule {
          id: module.id.inner().clone(),
          original_code: module.original_code.clone(),
          code: module.code.clone(),
          dependencies: module.import_records().map(|record| record.specifier.clone()).collect(),
        })
        .collect(),
    }
  }

  /// Groups modules into chunks. Every entry point anchors a chunk; the
  /// remaining modules are keyed by the set of entries that reach them over
  /// static edges, so a dynamic import boundary is never merged away.
  fn partition_chunks(&self) -> ChunkGraph {
    let module_count = self.module_table.len();
    let mut module_to_chunk: IndexVec<ModuleIdx, Option<ChunkIdx>> =
      IndexVec::from_iter(std::iter::repeat_n(None, module_count));
    let mut chunks: IndexVec<ChunkIdx, Chunk> = IndexVec::new();

    let mut exec_sorted: Vec<ModuleIdx> = self.module_table.indices().collect();
    exec_sorted.sort_by_key(|idx| self.module_table[*idx].exec_order);

    if self.options.preserve_modules {
      for module_idx in exec_sorted {
        let entry = self.entry_points.iter().enumerate().find(|(_, e)| e.id == module_idx);
        let kind = match entry {
          Some((bit, entry)) => ChunkKind::EntryPoint {
            is_user_defined: entry.kind.is_user_defined(),
            bit: bit as u32,
            module: module_idx,
          },
          None => ChunkKind::Common,
        };
        let chunk_idx = chunks.push(Chunk::new(
          None,
          BitSet::new(self.entry_points.len() as u32),
          vec![module_idx],
          kind,
        ));
        module_to_chunk[module_idx] = Some(chunk_idx);
      }
      return ChunkGraph { chunks, module_to_chunk };
    }

    if self.options.inline_dynamic_imports {
      let entry = self.entry_points.first().expect("validated to have exactly one entry");
      let mut bits = BitSet::new(1);
      bits.set_bit(0);
      let chunk_idx = chunks.push(Chunk::new(
        entry.name.clone(),
        bits,
        exec_sorted.clone(),
        ChunkKind::EntryPoint { is_user_defined: true, bit: 0, module: entry.id },
      ));
      for module_idx in exec_sorted {
        module_to_chunk[module_idx] = Some(chunk_idx);
      }
      return ChunkGraph { chunks, module_to_chunk };
    }

    let entry_count = self.entry_points.len() as u32;
    let mut bits_per_module: IndexVec<ModuleIdx, BitSet> =
      IndexVec::from_iter(std::iter::repeat_n(BitSet::new(entry_count), module_count));

    for (bit, entry) in self.entry_points.iter().enumerate() {
      self.color_reachable(entry.id, bit as u32, &mut bits_per_module);
    }

    // Entry modules anchor their chunks in entry order: user entries first,
    // dynamic entries in discovery order.
    let mut chunk_of_entry: FxHashMap<ModuleIdx, ChunkIdx> = FxHashMap::default();
    for (bit, entry) in self.entry_points.iter().enumerate() {
      let chunk_idx = chunks.push(Chunk::new(
        entry.name.clone(),
        bits_per_module[entry.id].clone(),
        vec![],
        ChunkKind::EntryPoint {
          is_user_defined: entry.kind.is_user_defined(),
          bit: bit as u32,
          module: entry.id,
        },
      ));
      chunk_of_entry.insert(entry.id, chunk_idx);
    }

    let mut manual_chunks: FxHashMap<String, ChunkIdx> = FxHashMap::default();
    let mut bits_chunks: FxHashMap<BitSet, ChunkIdx> = FxHashMap::default();

    for module_idx in exec_sorted {
      let module = &self.module_table[module_idx];
      let bits = &bits_per_module[module_idx];
      if bits.is_empty() {
        // Not reachable from any entry; dropped from the output.
        continue;
      }

      let chunk_idx = if let Some(chunk_idx) = chunk_of_entry.get(&module_idx) {
        *chunk_idx
      } else if let Some(name) =
        self.options.manual_chunks.as_ref().and_then(|manual| manual(&module.id))
      {
        *manual_chunks.entry(name.clone()).or_insert_with(|| {
          chunks.push(Chunk::new(Some(name.into()), bits.clone(), vec![], ChunkKind::Common))
        })
      } else if let Some(chunk_idx) = singleton_entry_bit(bits, entry_count)
        .and_then(|bit| chunk_of_entry.get(&self.entry_points[bit as usize].id))
      {
        // Reachable from exactly one entry: lives in that entry's chunk.
        *chunk_idx
      } else {
        *bits_chunks.entry(bits.clone()).or_insert_with(|| {
          chunks.push(Chunk::new(None, bits.clone(), vec![], ChunkKind::Common))
        })
      };

      chunks[chunk_idx].modules.push(module_idx);
      module_to_chunk[module_idx] = Some(chunk_idx);
    }

    ChunkGraph { chunks, module_to_chunk }
  }

  /// Marks `bit` on every module reachable from `from` over static imports.
  fn color_reachable(
    &self,
    from: ModuleIdx,
    bit: u32,
    bits_per_module: &mut IndexVec<ModuleIdx, BitSet>,
  ) {
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
      if bits_per_module[current].has_bit(bit) {
        continue;
      }
      bits_per_module[current].set_bit(bit);
      for record in &self.module_table[current].imports {
        if let ResolvedImport::Module(target) = &record.resolved {
          stack.push(*target);
        }
      }
    }
  }
}

fn singleton_entry_bit(bits: &BitSet, entry_count: u32) -> Option<u32> {
  let mut found = None;
  for bit in 0..entry_count {
    if bits.has_bit(bit) {
      if found.is_some() {
        return None;
      }
      found = Some(bit);
    }
  }
  found
}
