use arcstr::ArcStr;

/// Cache behavior requested by the caller.
#[derive(Debug, Default, Clone)]
pub enum CacheOption {
  /// Build a fresh cache and expose it on the handle.
  #[default]
  Default,
  /// Build without a cache; the handle exposes none.
  Disabled,
  /// Reuse the modules of a previous build where the loaded source is
  /// unchanged.
  Warm(BuildCache),
}

impl CacheOption {
  pub fn is_disabled(&self) -> bool {
    matches!(self, CacheOption::Disabled)
  }
}

#[derive(Debug, Default, Clone)]
pub struct BuildCache {
  pub modules: Vec<CachedModule>,
}

impl BuildCache {
  pub fn get(&self, id: &str) -> Option<&CachedModule> {
    self.modules.iter().find(|module| module.id.as_str() == id)
  }
}

#[derive(Debug, Clone)]
pub struct CachedModule {
  pub id: ArcStr,
  pub original_code: ArcStr,
  pub code: ArcStr,
  pub dependencies: Vec<String>,
}
