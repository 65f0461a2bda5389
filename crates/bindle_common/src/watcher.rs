/// Receives every module path the loader touches. Handed to the build
/// explicitly; the build consumes it once and never stores it beyond the
/// graph it was given to.
pub trait BuildWatcher: Send + Sync {
  fn add_watch_file(&self, id: &str);
}
