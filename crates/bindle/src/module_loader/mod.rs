pub mod scanner;

use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use bindle_common::{
  BuildWatcher, CacheOption, EntryPoint, EntryPointKind, FxIndexSet, ImportRecord, Module,
  ModuleId, ModuleIdx, ModuleTable, NormalizedInputOptions, ResolvedImport,
};
use bindle_error::{BuildError, BuildResult};
use bindle_fs::{FileSystem, OsFileSystem};
use bindle_plugin::PluginDriver;
use bindle_utils::path_ext::ModulePathExt;
use futures::future::try_join_all;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use sugar_path::SugarPath;

use crate::module_loader::scanner::ScanResult;

#[derive(Debug, Clone)]
enum Resolution {
  Internal(ArcStr),
  External(ArcStr),
}

pub struct ModuleLoaderOutput {
  pub module_table: ModuleTable,
  pub entry_points: Vec<EntryPoint>,
  pub watch_files: FxIndexSet<ArcStr>,
}

/// Fetches the transitive module graph starting from the entry list. Modules
/// are loaded in waves: every not-yet-visited id discovered by the previous
/// wave is resolved, loaded and scanned concurrently, then integrated.
pub struct ModuleLoader<'a> {
  fs: OsFileSystem,
  options: &'a NormalizedInputOptions,
  cache: &'a CacheOption,
  driver: &'a PluginDriver,
  watcher: Option<Arc<dyn BuildWatcher>>,
  visited: FxHashMap<ArcStr, ModuleIdx>,
  modules: IndexVec<ModuleIdx, Option<Module>>,
  entry_points: Vec<EntryPoint>,
  watch_files: FxIndexSet<ArcStr>,
}

struct LoadedModule {
  idx: ModuleIdx,
  id: ArcStr,
  original_code: ArcStr,
  code: ArcStr,
  scan: ScanResult,
}

impl<'a> ModuleLoader<'a> {
  pub fn new(
    fs: OsFileSystem,
    options: &'a NormalizedInputOptions,
    cache: &'a CacheOption,
    driver: &'a PluginDriver,
    watcher: Option<Arc<dyn BuildWatcher>>,
  ) -> Self {
    Self {
      fs,
      options,
      cache,
      driver,
      watcher,
      visited: FxHashMap::default(),
      modules: IndexVec::new(),
      entry_points: Vec::new(),
      watch_files: FxIndexSet::default(),
    }
  }

  pub async fn fetch_all_modules(mut self) -> BuildResult<ModuleLoaderOutput> {
    if self.options.input.is_empty() {
      Err(vec![anyhow::anyhow!("You must supply options.input to bindle")])?;
    }

    let mut pending: Vec<(ArcStr, ModuleIdx)> = Vec::new();

    for item in &self.options.input {
      let resolution = self
        .resolve(&item.import, None)
        .await
        .map_err(BuildError::from)?
        .ok_or_else(|| {
          BuildError::from(anyhow::anyhow!("Could not resolve entry module ({}).", item.import))
        })?;
      let id = match resolution {
        Resolution::Internal(id) => id,
        Resolution::External(_) => Err(vec![anyhow::anyhow!(
          "Entry module cannot be external ({}).",
          item.import
        )])?,
      };

      let idx = self.alloc_module(&id, &mut pending);
      self.entry_points.push(EntryPoint {
        name: item.name.clone().map(ArcStr::from),
        id: idx,
        kind: EntryPointKind::UserDefined,
      });
    }

    while !pending.is_empty() {
      let wave = std::mem::take(&mut pending);
      let loaded = try_join_all(wave.into_iter().map(|(id, idx)| self.load_and_scan(id, idx)))
        .await
        .map_err(BuildError::from)?;

      for module in loaded {
        self.integrate(module, &mut pending).await.map_err(BuildError::from)?;
      }
    }

    let mut module_table = ModuleTable::default();
    for module in self.modules {
      module_table.push(module.expect("every allocated module slot is filled"));
    }

    assign_exec_order(&mut module_table, &self.entry_points);

    Ok(ModuleLoaderOutput {
      module_table,
      entry_points: self.entry_points,
      watch_files: self.watch_files,
    })
  }

  fn alloc_module(&mut self, id: &ArcStr, pending: &mut Vec<(ArcStr, ModuleIdx)>) -> ModuleIdx {
    if let Some(existing) = self.visited.get(id) {
      return *existing;
    }
    let idx = self.modules.push(None);
    self.visited.insert(id.clone(), idx);
    self.watch_files.insert(id.clone());
    if let Some(watcher) = &self.watcher {
      watcher.add_watch_file(id);
    }
    pending.push((id.clone(), idx));
    idx
  }

  async fn load_and_scan(&self, id: ArcStr, idx: ModuleIdx) -> anyhow::Result<LoadedModule> {
    let original_code: ArcStr = match self.driver.load(&id).await? {
      Some(code) => code.into(),
      None => self
        .fs
        .read_to_string(Path::new(id.as_str()))
        .map_err(|error| anyhow::anyhow!("Could not load {id}: {error}"))?
        .into(),
    };

    // A warm cache lets unchanged modules skip the transform chain.
    let code: ArcStr = match self.cache {
      CacheOption::Warm(cache)
        if cache.get(&id).is_some_and(|cached| cached.original_code == original_code) =>
      {
        cache.get(&id).expect("checked above").code.clone()
      }
      _ => self.driver.transform(&id, original_code.to_string()).await?.into(),
    };

    let scan = scanner::scan(&code, &default_binding_for(&id));
    Ok(LoadedModule { idx, id, original_code, code, scan })
  }

  async fn integrate(
    &mut self,
    loaded: LoadedModule,
    pending: &mut Vec<(ArcStr, ModuleIdx)>,
  ) -> anyhow::Result<()> {
    let LoadedModule { idx, id, original_code, code, scan } = loaded;

    let mut imports = Vec::with_capacity(scan.imports.len());
    for import in scan.imports {
      let resolved = self.resolve_for_record(&import.specifier, &id, pending).await?;
      imports.push(ImportRecord { specifier: import.specifier, names: import.names, resolved });
    }

    let mut dynamic_imports = Vec::with_capacity(scan.dynamic_imports.len());
    for specifier in scan.dynamic_imports {
      let resolved = self.resolve_for_record(&specifier, &id, pending).await?;
      if let ResolvedImport::Module(target) = &resolved {
        if !self.options.inline_dynamic_imports
          && !self.entry_points.iter().any(|entry| entry.id == *target)
        {
          self.entry_points.push(EntryPoint {
            name: None,
            id: *target,
            kind: EntryPointKind::DynamicImport,
          });
        }
      }
      dynamic_imports.push(ImportRecord { specifier, names: vec![], resolved });
    }

    let is_user_defined_entry = self
      .entry_points
      .iter()
      .any(|entry| entry.id == idx && entry.kind.is_user_defined());

    self.modules[idx] = Some(Module {
      idx,
      id: ModuleId::new(id),
      original_code,
      code,
      imports,
      dynamic_imports,
      exports: scan.exports,
      is_user_defined_entry,
      exec_order: u32::MAX,
    });
    Ok(())
  }

  async fn resolve_for_record(
    &mut self,
    specifier: &str,
    importer: &ArcStr,
    pending: &mut Vec<(ArcStr, ModuleIdx)>,
  ) -> anyhow::Result<ResolvedImport> {
    match self.resolve(specifier, Some(importer.as_str())).await? {
      Some(Resolution::Internal(id)) => {
        let target = self.alloc_module(&id, pending);
        Ok(ResolvedImport::Module(target))
      }
      Some(Resolution::External(id)) => Ok(ResolvedImport::External(id)),
      None => Err(anyhow::anyhow!("Could not resolve '{specifier}' from {importer}")),
    }
  }

  async fn resolve(
    &self,
    specifier: &str,
    importer: Option<&str>,
  ) -> anyhow::Result<Option<Resolution>> {
    if let Some(id) = self.driver.resolve_id(specifier, importer).await? {
      return Ok(Some(Resolution::Internal(id.into())));
    }

    if !specifier.starts_with('.') && !Path::new(specifier).is_absolute() {
      if importer.is_none() {
        // Entry specifiers are looked up relative to the working directory
        // before being treated as external.
        if let Some(id) = self.resolve_file(specifier, self.options.cwd.as_path()) {
          return Ok(Some(Resolution::Internal(id)));
        }
      }
      return Ok(Some(Resolution::External(specifier.into())));
    }

    let base = importer
      .and_then(|importer| Path::new(importer).parent().map(Path::to_path_buf))
      .unwrap_or_else(|| self.options.cwd.clone());

    Ok(self.resolve_file(specifier, &base).map(Resolution::Internal))
  }

  fn resolve_file(&self, specifier: &str, base: &Path) -> Option<ArcStr> {
    let joined = base.join(specifier).normalize();
    let candidates = [joined.clone(), joined.with_extension("js")];
    candidates
      .iter()
      .find(|candidate| self.fs.is_file(candidate))
      .map(|candidate| ArcStr::from(candidate.to_slash_string()))
  }
}

/// Binding name assigned to a module's default export. Must be a legal
/// identifier, so the stem is mapped onto the identifier alphabet and a
/// leading digit gets an underscore prefix.
pub fn default_binding_for(id: &str) -> String {
  let stem = Path::new(id).module_stem();
  let mut binding: String = stem
    .chars()
    .map(|char| if char.is_ascii_alphanumeric() || char == '_' { char } else { '_' })
    .collect();
  if binding.chars().next().is_some_and(|first| first.is_ascii_digit()) {
    binding.insert(0, '_');
  }
  binding.push_str("_default");
  binding
}

/// Post-order over static then dynamic edges from each entry, mirroring
/// execution order within a chunk.
fn assign_exec_order(module_table: &mut ModuleTable, entry_points: &[EntryPoint]) {
  let mut order = 0u32;
  let mut visited = vec![false; module_table.len()];
  let mut stack: Vec<(ModuleIdx, usize)> = Vec::new();

  for entry in entry_points {
    if visited[entry.id.index()] {
      continue;
    }
    visited[entry.id.index()] = true;
    stack.push((entry.id, 0));

    while let Some((current, edge)) = stack.pop() {
      let targets: Vec<ModuleIdx> = module_table[current]
        .import_records()
        .filter_map(|record| match &record.resolved {
          ResolvedImport::Module(target) => Some(*target),
          ResolvedImport::External(_) => None,
        })
        .collect();

      if edge < targets.len() {
        stack.push((current, edge + 1));
        let target = targets[edge];
        if !visited[target.index()] {
          visited[target.index()] = true;
          stack.push((target, 0));
        }
      } else {
        module_table[current].exec_order = order;
        order += 1;
      }
    }
  }
}
