use memchr::memchr_iter;

fn lines_count(content: &str) -> u32 {
  u32::try_from(memchr_iter(b'\n', content.as_bytes()).count()).unwrap_or(u32::MAX)
}

pub trait Source {
  fn content(&self) -> &str;

  fn lines_count(&self) -> u32 {
    lines_count(self.content())
  }

  /// The original file this source was lifted from, when it should
  /// participate in the output source map.
  fn origin(&self) -> Option<&str> {
    None
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// A piece of output whose lines map one-to-one onto lines of an original
/// file, starting at its first line.
#[derive(Debug)]
pub struct SourceMapSource {
  content: String,
  origin: String,
  pre_computed_lines_count: Option<u32>,
}

impl SourceMapSource {
  pub fn new(content: String, origin: String) -> Self {
    Self { content, origin, pre_computed_lines_count: None }
  }

  #[must_use]
  pub fn with_lines_count(mut self, count: u32) -> Self {
    self.pre_computed_lines_count = Some(count);
    self
  }
}

impl Source for SourceMapSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn lines_count(&self) -> u32 {
    self.pre_computed_lines_count.unwrap_or_else(|| lines_count(&self.content))
  }

  fn origin(&self) -> Option<&str> {
    Some(&self.origin)
  }
}

impl<'a> Source for Box<dyn Source + Send + 'a> {
  fn content(&self) -> &str {
    self.as_ref().content()
  }

  fn lines_count(&self) -> u32 {
    self.as_ref().lines_count()
  }

  fn origin(&self) -> Option<&str> {
    self.as_ref().origin()
  }
}

#[cfg(test)]
mod tests {
  use super::{Source, SourceMapSource};

  #[test]
  fn counts_the_lines_of_a_module_body() {
    let body = "const a = 1;\nconst b = 2;\nexport { a, b };\n";
    let source = SourceMapSource::new(body.to_string(), "/app/src/pair.js".to_string());
    assert_eq!(source.lines_count(), 3);
    assert_eq!(source.origin(), Some("/app/src/pair.js"));
  }

  #[test]
  fn wrapper_lines_without_origin_still_count() {
    assert_eq!("(function () {".lines_count(), 0);
    assert_eq!("'use strict';\n".lines_count(), 1);
  }

  #[test]
  fn pre_computed_count_wins() {
    let source =
      SourceMapSource::new("a\nb".to_string(), "x.js".to_string()).with_lines_count(7);
    assert_eq!(source.lines_count(), 7);
  }
}
