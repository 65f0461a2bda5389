use bindle_common::OutputExports;
use bindle_sourcemap::SourceJoiner;

use super::{
  append_banner_and_intro, append_outro_and_footer, dependency_param, unpack_dependency,
  ChunkRenderContext,
};

pub fn render(ctx: &ChunkRenderContext) -> anyhow::Result<SourceJoiner<'static>> {
  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);

  let pre = ctx.pre_rendered();
  let export_mode = ctx.export_mode();
  let needs_exports_object =
    !pre.exports.is_empty() && !matches!(export_mode, OutputExports::Default | OutputExports::None);

  let mut deps: Vec<String> = Vec::new();
  let mut params: Vec<String> = Vec::new();
  if needs_exports_object {
    deps.push("'exports'".to_string());
    params.push("exports".to_string());
  }

  let sources: Vec<(String, _)> = pre
    .imports_from_external
    .iter()
    .map(|(specifier, names)| (specifier.to_string(), names))
    .chain(
      pre
        .imports_from_chunks
        .iter()
        .map(|(chunk_idx, names)| (ctx.import_path_of(*chunk_idx), names)),
    )
    .collect();

  for (index, (specifier, _)) in sources.iter().enumerate() {
    deps.push(format!("'{specifier}'"));
    params.push(dependency_param(index, specifier));
  }

  let id = ctx.options.amd_id.as_deref().map_or(String::new(), |id| format!("'{id}', "));
  joiner.append_source(format!(
    "define({id}[{}], function ({}) {{ 'use strict';",
    deps.join(", "),
    params.join(", ")
  ));

  for (index, (specifier, names)) in sources.iter().enumerate() {
    unpack_dependency(&mut joiner, &dependency_param(index, specifier), names);
  }

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  match export_mode {
    OutputExports::Default => {
      if let Some(local) = ctx.default_export_local() {
        joiner.append_source(format!("\nreturn {local};"));
      }
    }
    OutputExports::None => {}
    _ => {
      for export in &pre.exports {
        joiner.append_source(format!("exports.{} = {};", export.exported, export.local));
      }
    }
  }

  joiner.append_source("});");
  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}
