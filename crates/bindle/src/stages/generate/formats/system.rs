use bindle_sourcemap::SourceJoiner;

use super::{append_banner_and_intro, append_outro_and_footer, ChunkRenderContext};

pub fn render(ctx: &ChunkRenderContext) -> anyhow::Result<SourceJoiner<'static>> {
  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);

  let pre = ctx.pre_rendered();
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

  let deps: Vec<String> =
    sources.iter().map(|(specifier, _)| format!("'{specifier}'")).collect();
  joiner.append_source(format!(
    "System.register([{}], function (exports) {{ 'use strict';",
    deps.join(", ")
  ));

  let locals: Vec<&str> = sources
    .iter()
    .flat_map(|(_, names)| names.iter().map(|name| name.local.as_str()))
    .collect();
  if !locals.is_empty() {
    joiner.append_source(format!("var {};", locals.join(", ")));
  }

  let setters: Vec<String> = sources
    .iter()
    .map(|(_, names)| {
      let assignments: String = names
        .iter()
        .map(|name| match name.imported.as_str() {
          "*" => format!("{} = module;", name.local),
          "default" => format!("{} = module.default;", name.local),
          _ => format!("{} = module.{};", name.local, name.imported),
        })
        .collect::<Vec<_>>()
        .join(" ");
      format!("function (module) {{ {assignments} }}")
    })
    .collect();

  joiner.append_source("return {");
  joiner.append_source(format!("setters: [{}],", setters.join(", ")));
  joiner.append_source("execute: function () {");

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  for export in &pre.exports {
    joiner.append_source(format!("exports('{}', {});", export.exported, export.local));
  }

  joiner.append_source("}");
  joiner.append_source("};");
  joiner.append_source("});");
  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}
