use std::sync::Arc;

/// A non-fatal build notice routed through the caller-supplied sink.
#[derive(Debug, Clone)]
pub struct Warning {
  pub code: Option<&'static str>,
  pub plugin_code: Option<&'static str>,
  pub message: String,
}

impl Warning {
  pub fn new(message: impl Into<String>) -> Self {
    Self { code: None, plugin_code: None, message: message.into() }
  }

  #[must_use]
  pub fn with_code(mut self, code: &'static str) -> Self {
    self.code = Some(code);
    self
  }

  #[must_use]
  pub fn with_plugin_code(mut self, plugin_code: &'static str) -> Self {
    self.plugin_code = Some(plugin_code);
    self
  }
}

impl std::fmt::Display for Warning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.code {
      Some(code) => write!(f, "{code}: {}", self.message),
      None => write!(f, "{}", self.message),
    }
  }
}

pub type WarningHandler = Arc<dyn Fn(Warning) + Send + Sync>;
