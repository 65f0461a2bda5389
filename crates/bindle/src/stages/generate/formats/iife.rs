use bindle_common::OutputExports;
use bindle_error::Diagnostic;
use bindle_sourcemap::SourceJoiner;

use super::{
  append_banner_and_intro, append_outro_and_footer, dependency_param, unpack_dependency,
  ChunkRenderContext,
};

pub fn render(ctx: &ChunkRenderContext) -> anyhow::Result<SourceJoiner<'static>> {
  let pre = ctx.pre_rendered();
  let export_mode = ctx.export_mode();
  let has_exports = !pre.exports.is_empty() && !matches!(export_mode, OutputExports::None);

  if has_exports && ctx.options.name.is_none() {
    return Err(
      Diagnostic::new("You must supply output.name for IIFE bundles").into_error(),
    );
  }

  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);

  let externals: Vec<(String, _)> = pre
    .imports_from_external
    .iter()
    .map(|(specifier, names)| (specifier.to_string(), names))
    .collect();

  let params: Vec<String> = externals
    .iter()
    .enumerate()
    .map(|(index, (specifier, _))| dependency_param(index, specifier))
    .collect();
  let args: Vec<String> =
    externals.iter().map(|(specifier, _)| ctx.global_name(specifier)).collect();

  let assignment = if has_exports {
    format!("var {} = ", ctx.options.name.as_deref().expect("checked above"))
  } else {
    String::new()
  };
  joiner.append_source(format!("{assignment}(function ({}) {{ 'use strict';", params.join(", ")));

  for (index, (specifier, names)) in externals.iter().enumerate() {
    unpack_dependency(&mut joiner, &dependency_param(index, specifier), names);
  }

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  if has_exports {
    match export_mode {
      OutputExports::Default => {
        if let Some(local) = ctx.default_export_local() {
          joiner.append_source(format!("\nreturn {local};"));
        }
      }
      _ => {
        let fields: Vec<String> = pre
          .exports
          .iter()
          .map(|export| format!("{}: {}", export.exported, export.local))
          .collect();
        joiner.append_source(format!("\nreturn {{ {} }};", fields.join(", ")));
      }
    }
  }

  joiner.append_source(format!("}}({}));", args.join(", ")));
  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}
