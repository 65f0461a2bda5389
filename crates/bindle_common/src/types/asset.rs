use arcstr::ArcStr;
use bindle_utils::hash::short_hash;

use crate::{FxIndexMap, StrOrBytes};

/// An asset handed to the bundle by a plugin rather than produced by
/// rendering. Finalized once a file name has been derived from the asset
/// pattern and the hash of its source.
#[derive(Debug, Clone)]
pub struct EmittedAsset {
  pub name: ArcStr,
  pub source: Option<StrOrBytes>,
  pub filename: Option<ArcStr>,
}

/// All emitted assets of a build, keyed by reference id.
#[derive(Debug, Default, Clone)]
pub struct AssetStore {
  assets: FxIndexMap<ArcStr, EmittedAsset>,
}

impl AssetStore {
  pub fn emit(&mut self, name: &str, source: Option<StrOrBytes>) -> ArcStr {
    let reference_id: ArcStr =
      short_hash(format!("{name}:{}", self.assets.len()).as_bytes(), 8).into();
    self
      .assets
      .insert(reference_id.clone(), EmittedAsset { name: name.into(), source, filename: None });
    reference_id
  }

  pub fn set_source(&mut self, reference_id: &str, source: StrOrBytes) -> anyhow::Result<()> {
    let asset = self
      .assets
      .get_mut(reference_id)
      .ok_or_else(|| anyhow::anyhow!("Asset reference {reference_id} could not be found."))?;
    if asset.source.is_some() {
      anyhow::bail!("Asset source for {reference_id} is already set.");
    }
    asset.source = Some(source);
    Ok(())
  }

  pub fn filename(&self, reference_id: &str) -> anyhow::Result<ArcStr> {
    let asset = self
      .assets
      .get(reference_id)
      .ok_or_else(|| anyhow::anyhow!("Asset reference {reference_id} could not be found."))?;
    asset.filename.clone().ok_or_else(|| {
      anyhow::anyhow!("Asset \"{}\" has not been finalized yet.", asset.name)
    })
  }

  pub fn get_mut(&mut self, reference_id: &str) -> Option<&mut EmittedAsset> {
    self.assets.get_mut(reference_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &EmittedAsset)> {
    self.assets.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ArcStr, &mut EmittedAsset)> {
    self.assets.iter_mut()
  }

  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }
}
