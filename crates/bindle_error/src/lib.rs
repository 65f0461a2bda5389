mod diagnostic;
mod warning;

pub use crate::{
  diagnostic::{codes, Diagnostic},
  warning::{Warning, WarningHandler},
};

/// Everything that went wrong in one build phase, in the order it was
/// recorded. Plugin and collaborator errors are stored untouched, so callers
/// can recover the original values by downcasting; structured diagnostics
/// additionally surface their machine codes through [`BuildError::codes`].
#[derive(Debug, Default)]
pub struct BuildError {
  errors: Vec<anyhow::Error>,
}

impl BuildError {
  pub fn new(error: anyhow::Error) -> Self {
    Self { errors: vec![error] }
  }

  pub fn push(&mut self, error: anyhow::Error) {
    self.errors.push(error);
  }

  pub fn iter(&self) -> std::slice::Iter<'_, anyhow::Error> {
    self.errors.iter()
  }

  pub fn len(&self) -> usize {
    self.errors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  /// Machine codes of the structured diagnostics in this aggregate. Errors
  /// that are not [`Diagnostic`]s, or diagnostics that are message-only,
  /// contribute nothing.
  pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
    self
      .errors
      .iter()
      .filter_map(|error| error.downcast_ref::<Diagnostic>().and_then(|diagnostic| diagnostic.code))
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self::new(error)
  }
}

impl From<Vec<anyhow::Error>> for BuildError {
  fn from(errors: Vec<anyhow::Error>) -> Self {
    Self { errors }
  }
}

impl From<Diagnostic> for BuildError {
  fn from(diagnostic: Diagnostic) -> Self {
    Self::new(diagnostic.into_error())
  }
}

impl IntoIterator for BuildError {
  type Item = anyhow::Error;
  type IntoIter = std::vec::IntoIter<anyhow::Error>;

  fn into_iter(self) -> Self::IntoIter {
    self.errors.into_iter()
  }
}

impl<'a> IntoIterator for &'a BuildError {
  type Item = &'a anyhow::Error;
  type IntoIter = std::slice::Iter<'a, anyhow::Error>;

  fn into_iter(self) -> Self::IntoIter {
    self.errors.iter()
  }
}

impl std::fmt::Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (index, error) in self.errors.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

pub type BuildResult<T> = anyhow::Result<T, BuildError>;
