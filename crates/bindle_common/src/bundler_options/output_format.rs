use std::fmt::Display;

use bindle_error::Diagnostic;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Amd,
  Cjs,
  #[default]
  Esm,
  Iife,
  System,
  Umd,
}

impl OutputFormat {
  pub fn is_esm(self) -> bool {
    matches!(self, Self::Esm)
  }

  /// Umd and Iife bundles are single-file by construction.
  pub fn supports_code_splitting(self) -> bool {
    !matches!(self, Self::Umd | Self::Iife)
  }
}

impl Display for OutputFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Amd => write!(f, "amd"),
      Self::Cjs => write!(f, "cjs"),
      Self::Esm => write!(f, "esm"),
      Self::Iife => write!(f, "iife"),
      Self::System => write!(f, "system"),
      Self::Umd => write!(f, "umd"),
    }
  }
}

impl std::str::FromStr for OutputFormat {
  type Err = anyhow::Error;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "amd" => Ok(Self::Amd),
      "cjs" | "commonjs" => Ok(Self::Cjs),
      "es" | "esm" | "module" => Ok(Self::Esm),
      "iife" => Ok(Self::Iife),
      "system" => Ok(Self::System),
      "umd" => Ok(Self::Umd),
      "es6" => Err(
        Diagnostic::new(
          "The \"es6\" output format is deprecated - use \"esm\" instead",
        )
        .into_error(),
      ),
      _ => Err(
        Diagnostic::new(format!(
          "You must specify output.format, which can be one of 'amd', 'cjs', 'system', 'esm', 'iife' or 'umd' (received '{value}')"
        ))
        .into_error(),
      ),
    }
  }
}
