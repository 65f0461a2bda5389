use std::path::{Path, PathBuf};

use bindle_common::{NormalizedOutputOptions, Output, SourceMapOption};
use bindle_error::{BuildError, BuildResult};
use bindle_plugin::PluginDriver;
use bindle_sourcemap::{to_data_url, to_json_string};
use futures::future::try_join_all;

use crate::types::bundle_output::BundleOutput;

/// Persists a finalized bundle: every entry lands relative to `dir` (or the
/// directory of `file`), chunks get their source-map reference appended, and
/// the `on_write` hook runs after each chunk hits disk. Entries are written
/// concurrently; a chunk and its map file succeed or fail as a pair.
pub async fn write_bundle(
  out: &NormalizedOutputOptions,
  cwd: &Path,
  output: &BundleOutput,
  driver: &PluginDriver,
) -> BuildResult<()> {
  let dir = output_dir(out, cwd);
  tokio::fs::create_dir_all(&dir)
    .await
    .map_err(|error| BuildError::from(anyhow::anyhow!("Could not create {}: {error}", dir.display())))?;

  try_join_all(output.assets.iter().map(|entry| write_entry(out, &dir, entry, driver)))
    .await
    .map_err(BuildError::from)?;
  Ok(())
}

fn output_dir(out: &NormalizedOutputOptions, cwd: &Path) -> PathBuf {
  match (&out.dir, &out.file) {
    (Some(dir), _) => cwd.join(dir),
    (None, Some(file)) => {
      let file = cwd.join(file);
      file.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
    }
    (None, None) => cwd.to_path_buf(),
  }
}

async fn write_entry(
  out: &NormalizedOutputOptions,
  dir: &Path,
  entry: &Output,
  driver: &PluginDriver,
) -> anyhow::Result<()> {
  let path = dir.join(entry.filename());
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }

  match entry {
    Output::Asset(asset) => {
      tokio::fs::write(&path, asset.content_as_bytes()).await?;
      tracing::debug!(file = %path.display(), "wrote asset");
    }
    Output::Chunk(chunk) => {
      let mut code = chunk.code.clone();
      match (out.sourcemap, &chunk.map) {
        (SourceMapOption::File, Some(map)) => {
          let map_name = format!(
            "{}.map",
            Path::new(chunk.filename()).file_name().unwrap_or_default().to_string_lossy()
          );
          code.push_str(&format!("//# sourceMappingURL={map_name}\n"));
          let map_path = dir.join(format!("{}.map", chunk.filename()));
          tokio::fs::write(&path, &code).await?;
          tokio::fs::write(&map_path, to_json_string(map)?).await?;
        }
        (SourceMapOption::Inline, Some(map)) => {
          code.push_str(&format!("//# sourceMappingURL={}\n", to_data_url(map)?));
          tokio::fs::write(&path, &code).await?;
        }
        _ => {
          tokio::fs::write(&path, &code).await?;
        }
      }
      driver.on_write(chunk).await?;
      tracing::debug!(file = %path.display(), "wrote chunk");
    }
  }
  Ok(())
}
