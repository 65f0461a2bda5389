use arcstr::ArcStr;
use bindle_common::{
  ChunkIdx, ExportItem, FxIndexMap, ImportedName, ModuleTable, PreRenderedChunk, ResolvedImport,
};
use oxc_index::IndexVec;

use crate::{
  graph::ChunkGraph,
  module_loader::{default_binding_for, scanner},
  utils::chunk::cross_chunk_links::resolve_exported_binding,
};

/// Marker substituted for a dynamic import specifier until chunk file names
/// exist; the final render replaces it with a relative path. The NUL prefix
/// cannot occur in real specifiers.
pub fn dynamic_import_placeholder(chunk_idx: ChunkIdx) -> String {
  format!("\u{0}chunk:{}", chunk_idx.index())
}

/// Computes the format-independent skeleton of one chunk: rewritten module
/// bodies in execution order plus the hoisted import surface and the export
/// list.
pub fn pre_render_chunk(
  chunk_idx: ChunkIdx,
  chunk_graph: &ChunkGraph,
  modules: &ModuleTable,
  needed_exports: &IndexVec<ChunkIdx, Vec<ExportItem>>,
) -> PreRenderedChunk {
  let chunk = &chunk_graph.chunks[chunk_idx];
  let mut pre = PreRenderedChunk::default();

  let mut external_imports: FxIndexMap<ArcStr, Vec<ImportedName>> = FxIndexMap::default();
  let mut chunk_imports: FxIndexMap<ChunkIdx, Vec<ImportedName>> = FxIndexMap::default();

  for &module_idx in &chunk.modules {
    let module = &modules[module_idx];

    for record in &module.imports {
      match &record.resolved {
        ResolvedImport::Module(target_idx) => {
          let Some(target_chunk) = chunk_graph.module_to_chunk[*target_idx] else {
            continue;
          };
          if target_chunk == chunk_idx {
            continue;
          }
          let target = &modules[*target_idx];
          let names = chunk_imports.entry(target_chunk).or_default();
          for name in &record.names {
            if name.imported == "*" {
              push_unique_import(names, ImportedName {
                imported: "*".to_string(),
                local: name.local.clone(),
              });
            } else if let Some(local) = resolve_exported_binding(target, &name.imported) {
              push_unique_import(names, ImportedName {
                imported: local.to_string(),
                local: name.local.clone(),
              });
            }
          }
        }
        ResolvedImport::External(specifier) => {
          let names = external_imports.entry(specifier.clone()).or_default();
          for name in &record.names {
            push_unique_import(names, name.clone());
          }
        }
      }
    }

    for record in &module.dynamic_imports {
      if let ResolvedImport::Module(target_idx) = &record.resolved {
        if let Some(target_chunk) = chunk_graph.module_to_chunk[*target_idx] {
          if !pre.dynamic_imports.contains(&target_chunk) {
            pre.dynamic_imports.push(target_chunk);
          }
        }
      }
    }

    let body = rewrite_module_body(module_idx, chunk_idx, chunk_graph, modules);
    pre.sources.push((module_idx, body));
  }

  // Entry chunks expose their entry module's surface; every chunk also
  // exposes whatever other chunks pull out of it.
  let mut exports: Vec<ExportItem> = Vec::new();
  if let Some(entry_idx) = chunk.entry_module_idx() {
    exports.extend(modules[entry_idx].exports.iter().cloned());
  }
  for export in &needed_exports[chunk_idx] {
    if !exports.iter().any(|existing| existing.exported == export.exported) {
      exports.push(export.clone());
    }
  }

  pre.exports = exports;
  pre.imports_from_external = external_imports.into_iter().collect();
  pre.imports_from_chunks = chunk_imports.into_iter().collect();
  pre
}

fn rewrite_module_body(
  module_idx: bindle_common::ModuleIdx,
  chunk_idx: ChunkIdx,
  chunk_graph: &ChunkGraph,
  modules: &ModuleTable,
) -> String {
  let module = &modules[module_idx];
  let default_binding = default_binding_for(&module.id);

  scanner::rewrite(
    &module.code,
    &default_binding,
    |specifier, names| {
      let record = module
        .imports
        .iter()
        .find(|record| record.specifier == specifier);
      let Some(record) = record else {
        return scanner::ImportDisposition::Remove;
      };
      match &record.resolved {
        ResolvedImport::Module(target_idx)
          if chunk_graph.module_to_chunk[*target_idx] == Some(chunk_idx) =>
        {
          // Same chunk: the target's bindings are in scope. Emit aliases
          // where the written local name differs from the actual binding.
          let target = &modules[*target_idx];
          let aliases: Vec<String> = names
            .iter()
            .filter_map(|name| {
              let local = resolve_exported_binding(target, &name.imported)?;
              (local != name.local).then(|| format!("const {} = {};", name.local, local))
            })
            .collect();
          if aliases.is_empty() {
            scanner::ImportDisposition::Remove
          } else {
            scanner::ImportDisposition::Replace(aliases.join(" "))
          }
        }
        _ => scanner::ImportDisposition::Remove,
      }
    },
    |specifier| {
      let record = module
        .dynamic_imports
        .iter()
        .find(|record| record.specifier == specifier)?;
      match &record.resolved {
        ResolvedImport::Module(target_idx) => chunk_graph.module_to_chunk[*target_idx]
          .map(dynamic_import_placeholder),
        ResolvedImport::External(_) => None,
      }
    },
  )
}

fn push_unique_import(names: &mut Vec<ImportedName>, name: ImportedName) {
  if !names.iter().any(|existing| existing.local == name.local) {
    names.push(name);
  }
}
