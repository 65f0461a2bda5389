use bindle_common::{ImportedName, OutputExports};
use bindle_sourcemap::SourceJoiner;

use super::{append_banner_and_intro, append_outro_and_footer, ChunkRenderContext};

pub fn render(ctx: &ChunkRenderContext) -> anyhow::Result<SourceJoiner<'static>> {
  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);
  joiner.append_source("'use strict';");

  let pre = ctx.pre_rendered();
  for (specifier, names) in &pre.imports_from_external {
    append_require(&mut joiner, specifier, names);
  }
  for (chunk_idx, names) in &pre.imports_from_chunks {
    append_require(&mut joiner, &ctx.import_path_of(*chunk_idx), names);
  }

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  match ctx.export_mode() {
    OutputExports::Default => {
      if let Some(local) = ctx.default_export_local() {
        joiner.append_source(format!("\nmodule.exports = {local};"));
      }
    }
    OutputExports::None => {}
    _ => {
      if !pre.exports.is_empty() {
        let mut assignments = String::from("\n");
        for export in &pre.exports {
          assignments.push_str(&format!("exports.{} = {};\n", export.exported, export.local));
        }
        assignments.pop();
        joiner.append_source(assignments);
      }
    }
  }

  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}

fn append_require(joiner: &mut SourceJoiner<'static>, source: &str, names: &[ImportedName]) {
  if names.is_empty() {
    joiner.append_source(format!("require('{source}');"));
    return;
  }

  let mut named: Vec<String> = Vec::new();
  for name in names {
    match name.imported.as_str() {
      "*" | "default" => {
        joiner.append_source(format!("var {} = require('{source}');", name.local));
      }
      _ if name.imported == name.local => named.push(name.local.clone()),
      _ => named.push(format!("{}: {}", name.imported, name.local)),
    }
  }
  if !named.is_empty() {
    joiner.append_source(format!("var {{ {} }} = require('{source}');", named.join(", ")));
  }
}
