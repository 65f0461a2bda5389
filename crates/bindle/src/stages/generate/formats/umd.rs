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
  let default_mode = matches!(export_mode, OutputExports::Default) && has_exports;

  if has_exports && ctx.options.name.is_none() {
    return Err(Diagnostic::new("You must supply output.name for UMD bundles").into_error());
  }

  let externals: Vec<(String, _)> = pre
    .imports_from_external
    .iter()
    .map(|(specifier, names)| (specifier.to_string(), names))
    .collect();

  let requires: Vec<String> =
    externals.iter().map(|(specifier, _)| format!("require('{specifier}')")).collect();
  let amd_deps: Vec<String> =
    externals.iter().map(|(specifier, _)| format!("'{specifier}'")).collect();
  let globals: Vec<String> =
    externals.iter().map(|(specifier, _)| format!("global.{}", ctx.global_name(specifier))).collect();
  let params: Vec<String> = externals
    .iter()
    .enumerate()
    .map(|(index, (specifier, _))| dependency_param(index, specifier))
    .collect();

  let mut joiner = SourceJoiner::default();
  append_banner_and_intro(&mut joiner, ctx.addons);
  joiner.append_source("(function (global, factory) {");

  if default_mode {
    let name = ctx.options.name.as_deref().expect("checked above");
    joiner.append_source(format!(
      "typeof exports === 'object' && typeof module !== 'undefined' ? module.exports = factory({}) :",
      requires.join(", ")
    ));
    joiner.append_source(format!(
      "typeof define === 'function' && define.amd ? define([{}], factory) :",
      amd_deps.join(", ")
    ));
    joiner.append_source(format!("(global.{name} = factory({}));", globals.join(", ")));
    joiner.append_source(format!("}}(this, (function ({}) {{ 'use strict';", params.join(", ")));
  } else if has_exports {
    let name = ctx.options.name.as_deref().expect("checked above");
    let global_target = if ctx.options.extend {
      format!("(global.{name} = global.{name} || {{}})")
    } else {
      format!("(global.{name} = {{}})")
    };
    let mut exports_requires = vec!["exports".to_string()];
    exports_requires.extend(requires.iter().cloned());
    let mut exports_amd = vec!["'exports'".to_string()];
    exports_amd.extend(amd_deps.iter().cloned());
    let mut exports_globals = vec![global_target];
    exports_globals.extend(globals.iter().cloned());
    let mut exports_params = vec!["exports".to_string()];
    exports_params.extend(params.iter().cloned());

    joiner.append_source(format!(
      "typeof exports === 'object' && typeof module !== 'undefined' ? factory({}) :",
      exports_requires.join(", ")
    ));
    joiner.append_source(format!(
      "typeof define === 'function' && define.amd ? define([{}], factory) :",
      exports_amd.join(", ")
    ));
    joiner.append_source(format!("(factory({}));", exports_globals.join(", ")));
    joiner
      .append_source(format!("}}(this, (function ({}) {{ 'use strict';", exports_params.join(", ")));
  } else {
    joiner.append_source(format!(
      "typeof exports === 'object' && typeof module !== 'undefined' ? factory({}) :",
      requires.join(", ")
    ));
    joiner.append_source(format!(
      "typeof define === 'function' && define.amd ? define([{}], factory) :",
      amd_deps.join(", ")
    ));
    joiner.append_source(format!("(factory({}));", globals.join(", ")));
    joiner.append_source(format!("}}(this, (function ({}) {{ 'use strict';", params.join(", ")));
  }

  for (index, (specifier, names)) in externals.iter().enumerate() {
    unpack_dependency(&mut joiner, &dependency_param(index, specifier), names);
  }

  for source in ctx.module_sources() {
    joiner.append_source(source);
  }

  if default_mode {
    if let Some(local) = ctx.default_export_local() {
      joiner.append_source(format!("\nreturn {local};"));
    }
  } else if has_exports {
    for export in &pre.exports {
      joiner.append_source(format!("exports.{} = {};", export.exported, export.local));
    }
  }

  joiner.append_source("})));");
  append_outro_and_footer(&mut joiner, ctx.addons);
  Ok(joiner)
}
