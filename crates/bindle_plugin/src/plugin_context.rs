use std::sync::Arc;

use arcstr::ArcStr;
use bindle_common::{AssetStore, StrOrBytes};
use bindle_error::{Warning, WarningHandler};
use parking_lot::Mutex;

/// Capabilities handed to every hook: asset emission against the build's
/// asset store and warning routing. During `generate_bundle` the driver
/// swaps in a store snapshot so emissions stay scoped to that call.
#[derive(Clone)]
pub struct PluginContext {
  assets: Arc<Mutex<AssetStore>>,
  warn: WarningHandler,
}

impl PluginContext {
  pub fn new(assets: Arc<Mutex<AssetStore>>, warn: WarningHandler) -> Self {
    Self { assets, warn }
  }

  /// The same context with emissions redirected to `assets`.
  #[must_use]
  pub fn scoped_to(&self, assets: Arc<Mutex<AssetStore>>) -> Self {
    Self { assets, warn: self.warn.clone() }
  }

  pub fn emit_asset(&self, name: &str, source: Option<StrOrBytes>) -> ArcStr {
    self.assets.lock().emit(name, source)
  }

  pub fn set_asset_source(&self, reference_id: &str, source: StrOrBytes) -> anyhow::Result<()> {
    self.assets.lock().set_source(reference_id, source)
  }

  pub fn get_asset_file_name(&self, reference_id: &str) -> anyhow::Result<ArcStr> {
    self.assets.lock().filename(reference_id)
  }

  pub fn warn(&self, warning: Warning) {
    (self.warn)(warning);
  }
}

impl std::fmt::Debug for PluginContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PluginContext").finish_non_exhaustive()
  }
}
