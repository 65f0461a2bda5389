use bindle_common::{ChunkIdx, ChunkKind, ModuleTable};

use crate::graph::ChunkGraph;

/// Folds shared chunks smaller than `chunk_grouping_size` into another
/// chunk that is already loaded whenever they would be (its entry bits are a
/// superset). Entry chunks are never merged away.
pub fn optimize_chunks(
  chunk_graph: &mut ChunkGraph,
  modules: &ModuleTable,
  chunk_grouping_size: usize,
) {
  let candidates: Vec<ChunkIdx> = chunk_graph
    .chunks
    .indices()
    .filter(|idx| {
      let chunk = &chunk_graph.chunks[*idx];
      chunk.is_alive
        && matches!(chunk.kind, ChunkKind::Common)
        && chunk_size(chunk_graph, modules, *idx) < chunk_grouping_size
    })
    .collect();

  for small_idx in candidates {
    let target_idx = chunk_graph.chunks.indices().find(|idx| {
      *idx != small_idx
        && chunk_graph.chunks[*idx].is_alive
        && chunk_graph.chunks[*idx].bits.contains_all(&chunk_graph.chunks[small_idx].bits)
    });
    let Some(target_idx) = target_idx else {
      continue;
    };

    let merged_modules = std::mem::take(&mut chunk_graph.chunks[small_idx].modules);
    for module_idx in &merged_modules {
      chunk_graph.module_to_chunk[*module_idx] = Some(target_idx);
    }
    let target = &mut chunk_graph.chunks[target_idx];
    target.modules.extend(merged_modules);
    target.modules.sort_by_key(|module_idx| modules[*module_idx].exec_order);
    chunk_graph.chunks[small_idx].is_alive = false;

    tracing::debug!(merged = small_idx.index(), into = target_idx.index(), "merged small chunk");
  }
}

fn chunk_size(chunk_graph: &ChunkGraph, modules: &ModuleTable, idx: ChunkIdx) -> usize {
  chunk_graph.chunks[idx].modules.iter().map(|module_idx| modules[*module_idx].code.len()).sum()
}
