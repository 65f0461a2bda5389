use std::path::{Component, Path, PathBuf};

/// Longest common directory of the given absolute paths. Yields an empty path
/// when the list is empty or the paths share no prefix.
pub fn commondir(paths: &[&Path]) -> PathBuf {
  let Some((first, rest)) = paths.split_first() else {
    return PathBuf::new();
  };

  let mut common: Vec<Component> = first.parent().map(|p| p.components().collect()).unwrap_or_default();

  for path in rest {
    let parent: Vec<Component> = path.parent().map(|p| p.components().collect()).unwrap_or_default();
    let shared = common.iter().zip(parent.iter()).take_while(|(a, b)| a == b).count();
    common.truncate(shared);
  }

  common.iter().collect()
}

#[cfg(test)]
mod tests {
  use super::commondir;
  use std::path::Path;

  #[test]
  fn shared_prefix() {
    let paths = [Path::new("/a/b/c/main.js"), Path::new("/a/b/d/other.js")];
    assert_eq!(commondir(&paths), Path::new("/a/b"));
  }

  #[test]
  fn single_path_yields_parent() {
    let paths = [Path::new("/a/b/main.js")];
    assert_eq!(commondir(&paths), Path::new("/a/b"));
  }

  #[test]
  fn empty_input() {
    assert_eq!(commondir(&[]), Path::new(""));
  }
}
