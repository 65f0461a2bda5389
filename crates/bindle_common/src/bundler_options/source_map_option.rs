#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapOption {
  #[default]
  Disabled,
  /// A sibling `.map` file plus a `sourceMappingURL` comment.
  File,
  /// The whole map as a base64 `data:` url appended to the code.
  Inline,
}

impl SourceMapOption {
  pub fn is_enabled(self) -> bool {
    !matches!(self, Self::Disabled)
  }
}
