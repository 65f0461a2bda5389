mod bundler_options;
mod cache;
mod chunk;
mod module;
mod types;
mod watcher;

pub use bundler_options::{
  filename_template::{FileNameRenderOptions, FilenameTemplate},
  from_json::input_options_from_json,
  input_item::InputItem,
  normalized_input_options::NormalizedInputOptions,
  normalized_output_options::NormalizedOutputOptions,
  output_exports::OutputExports,
  output_format::OutputFormat,
  output_options::OutputOptions,
  source_map_option::SourceMapOption,
  InputOptions, ManualChunksFn, OnWarn,
};

pub use crate::{
  cache::{BuildCache, CacheOption, CachedModule},
  chunk::{Chunk, ChunkKind},
  module::{ExportItem, ImportRecord, ImportedName, Module, ModuleTable, ResolvedImport},
  types::{
    asset::{AssetStore, EmittedAsset},
    entry_point::{EntryPoint, EntryPointKind},
    module_id::ModuleId,
    output::{Output, OutputBundle},
    output_asset::OutputAsset,
    output_chunk::OutputChunk,
    pre_rendered_chunk::PreRenderedChunk,
    raw_idx::{ChunkIdx, ModuleIdx},
    rendered_module::RenderedModule,
    str_or_bytes::StrOrBytes,
    FxIndexMap, FxIndexSet,
  },
  watcher::BuildWatcher,
};
