use std::{io, path::Path};

/// Filesystem access used by the module loader and the bundle writer.
/// Implementations must be cheap to clone and safe to share across tasks.
pub trait FileSystem: Send + Sync {
  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  fn is_file(&self, path: &Path) -> bool;
}
