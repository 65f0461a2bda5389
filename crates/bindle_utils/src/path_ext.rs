use std::{borrow::Cow, path::Path};

use sugar_path::SugarPath;

/// Path helpers for deriving module ids and chunk names.
pub trait ModulePathExt {
  /// Forward-slash spelling of the path, the canonical module-id form on
  /// every platform. Non-UTF-8 segments are replaced, not rejected.
  fn to_slash_string(&self) -> String;

  /// The name a module contributes to its chunk: the file stem, except that
  /// `index` and `mod` files borrow their directory's name, which is the
  /// more recognizable one.
  fn module_stem(&self) -> Cow<'_, str>;
}

impl ModulePathExt for Path {
  fn to_slash_string(&self) -> String {
    self.to_slash_lossy().into_owned()
  }

  fn module_stem(&self) -> Cow<'_, str> {
    let stem =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());
    if matches!(&*stem, "index" | "mod") {
      if let Some(parent) = self.parent().and_then(Path::file_stem) {
        return parent.to_string_lossy();
      }
    }
    stem
  }
}
