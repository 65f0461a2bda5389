use sourcemap::{SourceMap, SourceMapBuilder};

use crate::source::Source;

/// Joins rendered sources with `\n` while tracking line offsets, so a
/// line-based source map can be produced for the joined output.
#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
}

impl<'source> SourceJoiner<'source> {
  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn join(&self) -> String {
    let sources_len = self.inner.len();
    let size_hint =
      self.inner.iter().map(|source| source.content().len()).sum::<usize>() + sources_len;

    let mut joined = String::with_capacity(size_hint);
    for (index, source) in self.inner.iter().enumerate() {
      joined.push_str(source.content());
      if index < sources_len - 1 {
        joined.push('\n');
      }
    }
    joined
  }

  /// Joins the sources and builds a map token per output line for every
  /// source that names an origin file.
  pub fn join_with_sourcemap(&self, file: &str) -> (String, SourceMap) {
    let joined = self.join();

    let mut builder = SourceMapBuilder::new(Some(file));
    let mut dst_line = 0u32;
    for source in &self.inner {
      let lines = source.lines_count();
      if let Some(origin) = source.origin() {
        let src_id = builder.add_source(origin);
        builder.set_source_contents(src_id, Some(source.content()));
        for line in 0..=lines {
          builder.add_raw(dst_line + line, 0, line, 0, Some(src_id), None, false);
        }
      }
      dst_line += lines + 1;
    }

    (joined, builder.into_sourcemap())
  }
}

#[cfg(test)]
mod tests {
  use super::SourceJoiner;
  use crate::source::SourceMapSource;

  #[test]
  fn joins_with_single_newline() {
    let mut joiner = SourceJoiner::default();
    joiner.append_source("a");
    joiner.append_source("b\nc");
    assert_eq!(joiner.join(), "a\nb\nc");
  }

  #[test]
  fn maps_lines_back_to_origin() {
    let mut joiner = SourceJoiner::default();
    joiner.append_source("// banner");
    joiner.append_source(SourceMapSource::new("const a = 1;\nconst b = 2;".into(), "src/a.js".into()));

    let (joined, map) = joiner.join_with_sourcemap("out.js");
    assert_eq!(joined, "// banner\nconst a = 1;\nconst b = 2;");

    let token = map.lookup_token(2, 0).expect("token for last line");
    assert_eq!(token.get_source(), Some("src/a.js"));
    assert_eq!(token.get_src_line(), 1);
  }
}
