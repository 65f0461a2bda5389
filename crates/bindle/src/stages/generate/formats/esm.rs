use bindle_common::ImportedName;
use bindle_sourcemap::SourceJoiner;

use super::{append_banner_and_intro, append_outro_and_footer, ChunkRenderContext};

pub fn render(ctx: &ChunkRenderContext) -> anyhow::Result<SourceJoiner<'static>> {
  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);

  let pre = ctx.pre_rendered();
  for (specifier, names) in &pre.imports_from_external {
    for statement in import_statements(specifier, names) {
      joiner.append_source(statement);
    }
  }
  for (chunk_idx, names) in &pre.imports_from_chunks {
    let path = ctx.import_path_of(*chunk_idx);
    for statement in import_statements(&path, names) {
      joiner.append_source(statement);
    }
  }

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  if !pre.exports.is_empty() {
    let bindings: Vec<String> = pre
      .exports
      .iter()
      .map(|export| {
        if export.exported == export.local {
          export.local.clone()
        } else {
          format!("{} as {}", export.local, export.exported)
        }
      })
      .collect();
    joiner.append_source(format!("\nexport {{ {} }};", bindings.join(", ")));
  }

  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}

/// Reassembles import statements for one source: namespace bindings need
/// their own statement, the first default binding heads the clause, any
/// further defaults fold into the named group.
fn import_statements(source: &str, names: &[ImportedName]) -> Vec<String> {
  if names.is_empty() {
    return vec![format!("import '{source}';")];
  }

  let mut statements = Vec::new();
  let mut default_head: Option<&str> = None;
  let mut named: Vec<String> = Vec::new();

  for name in names {
    match name.imported.as_str() {
      "*" => statements.push(format!("import * as {} from '{source}';", name.local)),
      "default" if default_head.is_none() => default_head = Some(&name.local),
      "default" => named.push(format!("default as {}", name.local)),
      _ if name.imported == name.local => named.push(name.local.clone()),
      _ => named.push(format!("{} as {}", name.imported, name.local)),
    }
  }

  match (default_head, named.is_empty()) {
    (Some(head), true) => statements.push(format!("import {head} from '{source}';")),
    (Some(head), false) => {
      statements.push(format!("import {head}, {{ {} }} from '{source}';", named.join(", ")));
    }
    (None, false) => {
      statements.push(format!("import {{ {} }} from '{source}';", named.join(", ")));
    }
    (None, true) => {}
  }

  statements
}

#[cfg(test)]
mod tests {
  use super::import_statements;
  use bindle_common::ImportedName;

  fn name(imported: &str, local: &str) -> ImportedName {
    ImportedName { imported: imported.to_string(), local: local.to_string() }
  }

  #[test]
  fn side_effect_import() {
    assert_eq!(import_statements("./dep.js", &[]), vec!["import './dep.js';"]);
  }

  #[test]
  fn mixed_clause() {
    let statements = import_statements(
      "lodash",
      &[name("default", "_"), name("map", "map"), name("*", "ns")],
    );
    assert_eq!(
      statements,
      vec![
        "import * as ns from 'lodash';".to_string(),
        "import _, { map } from 'lodash';".to_string(),
      ]
    );
  }
}
