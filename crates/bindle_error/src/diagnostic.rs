/// A build failure with an optional machine-readable code and documentation
/// anchor. Errors surfaced by plugins keep their identity and never pass
/// through here.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
  pub code: Option<&'static str>,
  pub message: String,
  pub url: Option<&'static str>,
}

impl Diagnostic {
  pub fn new(message: impl Into<String>) -> Self {
    Self { code: None, message: message.into(), url: None }
  }

  #[must_use]
  pub fn with_code(mut self, code: &'static str) -> Self {
    self.code = Some(code);
    self
  }

  #[must_use]
  pub fn with_url(mut self, url: &'static str) -> Self {
    self.url = Some(url);
    self
  }

  pub fn into_error(self) -> anyhow::Error {
    anyhow::Error::new(self)
  }
}

pub mod codes {
  pub const INVALID_OPTION: &str = "INVALID_OPTION";
  pub const UNKNOWN_OPTION: &str = "UNKNOWN_OPTION";
  pub const PLUGIN_WARNING: &str = "PLUGIN_WARNING";
  pub const MISSING_GLOBAL_NAME: &str = "MISSING_GLOBAL_NAME";
  pub const MIXED_EXPORTS: &str = "MIXED_EXPORTS";
  pub const ONGENERATE_HOOK_DEPRECATED: &str = "ONGENERATE_HOOK_DEPRECATED";
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn carries_code_and_url() {
    let diagnostic = Diagnostic::new("forbidden combination")
      .with_code(codes::INVALID_OPTION)
      .with_url("https://rollupjs.org/guide/en/#outputdir");
    assert_eq!(diagnostic.to_string(), "forbidden combination");
    assert_eq!(diagnostic.code, Some("INVALID_OPTION"));

    let error = diagnostic.into_error();
    assert!(error.downcast_ref::<Diagnostic>().is_some());
  }
}
