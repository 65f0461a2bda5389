use std::path::Path;

use arcstr::ArcStr;
use bindle_common::{
  EmittedAsset, FileNameRenderOptions, FilenameTemplate, Output, OutputAsset, OutputBundle,
};
use bindle_utils::hash::short_hash;

const ASSET_HASH_LEN: usize = 8;

/// Derives the asset's file name from the asset pattern and the hash of its
/// source, then places it into the bundle. An asset without a source cannot
/// be finalized.
pub fn finalize_asset(
  asset: &mut EmittedAsset,
  asset_filenames: &str,
  bundle: &mut OutputBundle,
) -> anyhow::Result<()> {
  let Some(source) = asset.source.clone() else {
    anyhow::bail!(
      "Plugin error creating asset \"{}\" - no asset source set.",
      asset.name
    );
  };

  let path = Path::new(asset.name.as_str());
  let stem = path.file_stem().map_or_else(
    || asset.name.to_string(),
    |stem| {
      // Asset names come from plugins and may carry anything; keep the
      // file-name-portable characters only.
      stem
        .to_string_lossy()
        .chars()
        .map(|char| {
          if char.is_ascii_alphanumeric() || matches!(char, '-' | '_') { char } else { '_' }
        })
        .collect()
    },
  );
  let ext = path.extension().map(|ext| ext.to_string_lossy().to_string()).unwrap_or_default();
  let hash = short_hash(source.as_bytes(), ASSET_HASH_LEN);

  let filename: ArcStr = FilenameTemplate::new(asset_filenames.to_string())
    .render(&FileNameRenderOptions { name: Some(&stem), hash: Some(&hash), ext: Some(&ext) })
    .into();

  asset.filename = Some(filename.clone());
  bundle.insert(
    filename.clone(),
    Output::Asset(Box::new(OutputAsset { filename, source })),
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::finalize_asset;
  use bindle_common::{EmittedAsset, OutputBundle};

  #[test]
  fn names_asset_from_pattern_and_hash() {
    let mut asset =
      EmittedAsset { name: "logo.svg".into(), source: Some("<svg/>".into()), filename: None };
    let mut bundle = OutputBundle::default();
    finalize_asset(&mut asset, "assets/[name]-[hash][extname]", &mut bundle).unwrap();

    let filename = asset.filename.unwrap();
    assert!(filename.starts_with("assets/logo-"));
    assert!(filename.ends_with(".svg"));
    assert!(bundle.contains_key(&filename));
  }

  #[test]
  fn sourceless_asset_fails() {
    let mut asset = EmittedAsset { name: "data.bin".into(), source: None, filename: None };
    let mut bundle = OutputBundle::default();
    let error = finalize_asset(&mut asset, "assets/[name]-[hash][extname]", &mut bundle)
      .unwrap_err();
    assert!(error.to_string().contains("no asset source set"));
  }
}
