use bindle_common::{ChunkIdx, ExportItem, Module, ModuleTable, ResolvedImport};
use oxc_index::IndexVec;

use crate::graph::ChunkGraph;

/// For every chunk, the bindings that other chunks import from its modules.
/// A chunk exports these under their local binding names; importers alias
/// them back to whatever local name they were written with.
pub fn compute_cross_chunk_exports(
  chunk_graph: &ChunkGraph,
  modules: &ModuleTable,
) -> IndexVec<ChunkIdx, Vec<ExportItem>> {
  let mut needed: IndexVec<ChunkIdx, Vec<ExportItem>> =
    IndexVec::from_iter(std::iter::repeat_n(Vec::new(), chunk_graph.chunks.len()));

  for module in modules.iter() {
    let Some(from_chunk) = chunk_graph.module_to_chunk[module.idx] else {
      continue;
    };
    for record in &module.imports {
      let ResolvedImport::Module(target_idx) = &record.resolved else {
        continue;
      };
      let Some(target_chunk) = chunk_graph.module_to_chunk[*target_idx] else {
        continue;
      };
      if target_chunk == from_chunk {
        continue;
      }

      let target = &modules[*target_idx];
      for name in &record.names {
        if name.imported == "*" {
          // A namespace import pulls the target module's whole surface.
          for export in &target.exports {
            push_unique(&mut needed[target_chunk], &export.local, &export.local);
          }
        } else if let Some(local) = resolve_exported_binding(target, &name.imported) {
          push_unique(&mut needed[target_chunk], local, local);
        }
      }
    }
  }

  needed
}

/// The local binding a module exposes under `exported`, if any.
pub fn resolve_exported_binding<'m>(module: &'m Module, exported: &str) -> Option<&'m str> {
  module
    .exports
    .iter()
    .find(|export| export.exported == exported)
    .map(|export| export.local.as_str())
}

fn push_unique(exports: &mut Vec<ExportItem>, exported: &str, local: &str) {
  if !exports.iter().any(|export| export.exported == exported) {
    exports.push(ExportItem { exported: exported.to_string(), local: local.to_string() });
  }
}
