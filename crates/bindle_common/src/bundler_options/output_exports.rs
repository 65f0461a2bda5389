#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputExports {
  #[default]
  Auto,
  Default,
  Named,
  None,
}

impl std::fmt::Display for OutputExports {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Auto => write!(f, "auto"),
      Self::Default => write!(f, "default"),
      Self::Named => write!(f, "named"),
      Self::None => write!(f, "none"),
    }
  }
}
