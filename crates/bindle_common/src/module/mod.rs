use std::ops::{Deref, DerefMut};

use arcstr::ArcStr;
use oxc_index::IndexVec;

use crate::{ModuleId, ModuleIdx};

#[derive(Debug)]
pub struct Module {
  pub idx: ModuleIdx,
  pub id: ModuleId,
  pub original_code: ArcStr,
  pub code: ArcStr,
  pub imports: Vec<ImportRecord>,
  pub dynamic_imports: Vec<ImportRecord>,
  pub exports: Vec<ExportItem>,
  pub is_user_defined_entry: bool,
  pub exec_order: u32,
}

impl Module {
  pub fn import_records(&self) -> impl Iterator<Item = &ImportRecord> {
    self.imports.iter().chain(self.dynamic_imports.iter())
  }
}

/// A single `import`/`export ... from` statement after resolution.
#[derive(Debug, Clone)]
pub struct ImportRecord {
  pub specifier: String,
  pub names: Vec<ImportedName>,
  pub resolved: ResolvedImport,
}

#[derive(Debug, Clone)]
pub enum ResolvedImport {
  Module(ModuleIdx),
  External(ArcStr),
}

/// One imported binding. `imported` is `default` for default imports and `*`
/// for namespace imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
  pub imported: String,
  pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
  pub exported: String,
  pub local: String,
}

#[derive(Debug, Default)]
pub struct ModuleTable {
  pub modules: IndexVec<ModuleIdx, Module>,
}

impl Deref for ModuleTable {
  type Target = IndexVec<ModuleIdx, Module>;

  fn deref(&self) -> &Self::Target {
    &self.modules
  }
}

impl DerefMut for ModuleTable {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.modules
  }
}
