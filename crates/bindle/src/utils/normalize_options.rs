use std::sync::Arc;

use bindle_common::{
  InputOptions, NormalizedInputOptions, NormalizedOutputOptions, OutputExports, OutputFormat,
  OutputOptions,
};
use bindle_error::{codes, BuildResult, Diagnostic, Warning, WarningHandler};
use bindle_plugin::SharedPlugin;

/// Chunks smaller than this are candidates for merging when chunk
/// optimization is requested.
const DEFAULT_CHUNK_GROUPING_SIZE: usize = 5000;

const DOC_URL_OUTPUT_DIR: &str = "https://rollupjs.org/guide/en/#outputdir";

fn default_warning_handler() -> WarningHandler {
  Arc::new(|warning: Warning| {
    tracing::warn!(code = warning.code, plugin_code = warning.plugin_code, "{}", warning.message);
  })
}

fn invalid_option(message: impl Into<String>) -> Diagnostic {
  Diagnostic::new(message).with_code(codes::INVALID_OPTION).with_url(DOC_URL_OUTPUT_DIR)
}

#[derive(Debug)]
pub struct NormalizeInputReturn {
  pub options: NormalizedInputOptions,
  pub cache: bindle_common::CacheOption,
}

/// Validates and freezes the caller configuration: applies the plugin
/// `options` chain, reports unknown top-level keys, and enforces the chunking
/// flag invariants.
pub async fn normalize_input(
  raw: Option<InputOptions>,
  plugins: &[SharedPlugin],
) -> BuildResult<NormalizeInputReturn> {
  let Some(mut raw) = raw else {
    return Err(
      Diagnostic::new("You must supply an options object to bindle").into(),
    );
  };

  // Each plugin may hand back a replacement configuration for the next.
  for plugin in plugins {
    if let Some(replaced) = plugin.options(&raw).await.map_err(bindle_error::BuildError::from)? {
      raw = replaced;
    }
  }

  let warn = match raw.on_warn.clone() {
    Some(on_warn) => {
      let default = default_warning_handler();
      Arc::new(move |warning: Warning| on_warn(warning, &default)) as WarningHandler
    }
    None => default_warning_handler(),
  };

  for unknown in &raw.unknown_options {
    warn(
      Warning::new(format!(
        "Unknown input option: {unknown}. Allowed options: cache, chunkGroupingSize, cwd, inlineDynamicImports, input, manualChunks, onwarn, optimizeChunks, output, perf, plugins, preserveModules"
      ))
      .with_code(codes::UNKNOWN_OPTION),
    );
  }

  if raw.inline_dynamic_imports {
    if raw.manual_chunks.is_some() {
      return Err(
        invalid_option("The manualChunks option is not supported for inlineDynamicImports.")
          .into(),
      );
    }
    if raw.optimize_chunks {
      return Err(
        invalid_option("The optimizeChunks option is not supported for inlineDynamicImports.")
          .into(),
      );
    }
    if raw.input.len() > 1 {
      return Err(
        invalid_option("Multiple inputs are not supported for inlineDynamicImports.")
          .into(),
      );
    }
  }

  if raw.preserve_modules {
    if raw.inline_dynamic_imports {
      return Err(
        invalid_option("The inlineDynamicImports option is not supported for preserveModules.")
          .into(),
      );
    }
    if raw.manual_chunks.is_some() {
      return Err(
        invalid_option("preserveModules does not support the manualChunks option.")
          .into(),
      );
    }
    if raw.optimize_chunks {
      return Err(
        invalid_option("preserveModules does not support the optimizeChunks option.")
          .into(),
      );
    }
  }

  let cwd = match raw.cwd {
    Some(cwd) => cwd,
    None => std::env::current_dir()
      .map_err(|error| anyhow::anyhow!("Failed to get the current dir: {error}"))?,
  };

  Ok(NormalizeInputReturn {
    options: NormalizedInputOptions {
      input: raw.input,
      cwd,
      preserve_modules: raw.preserve_modules,
      inline_dynamic_imports: raw.inline_dynamic_imports,
      manual_chunks: raw.manual_chunks,
      optimize_chunks: raw.optimize_chunks,
      chunk_grouping_size: raw.chunk_grouping_size.unwrap_or(DEFAULT_CHUNK_GROUPING_SIZE),
      warn,
      perf: raw.perf,
      output: raw.output.unwrap_or_default(),
    },
    cache: raw.cache,
  })
}

/// Layers the input-level output defaults beneath the per-call options and
/// enforces the format and single-file invariants. `has_multiple_chunks`
/// carries the caller's knowledge of the built chunk list; pre-build checks
/// that only depend on the input shape run regardless.
pub fn normalize_output(
  raw: OutputOptions,
  input: &NormalizedInputOptions,
  has_multiple_chunks: bool,
) -> BuildResult<NormalizedOutputOptions> {
  let merged = raw.merged_over(&input.output);

  let Some(format) = merged.format.as_deref() else {
    return Err(
      Diagnostic::new(
        "You must specify output.format, which can be one of 'amd', 'cjs', 'system', 'esm', 'iife' or 'umd'",
      )
      .into(),
    );
  };
  let format: OutputFormat = format.parse().map_err(bindle_error::BuildError::from)?;

  if merged.file.is_some() && merged.dir.is_some() {
    return Err(
      invalid_option(
        "You must set either output.file for a single-file build or output.dir when generating multiple chunks.",
      )
      .into(),
    );
  }

  if merged.file.is_some() {
    if input.has_named_input() {
      return Err(
        invalid_option("You must set output.dir instead of output.file when providing named inputs.")
          .into(),
      );
    }
    if input.input.len() > 1 || has_multiple_chunks {
      return Err(
        invalid_option(
          "You must set output.dir instead of output.file when generating multiple chunks.",
        )
        .into(),
      );
    }
    if input.preserve_modules {
      return Err(
        invalid_option(
          "You must set output.dir instead of output.file when using the preserveModules option.",
        )
        .into(),
      );
    }
  }

  if has_multiple_chunks {
    if !format.supports_code_splitting() {
      return Err(
        invalid_option("UMD and IIFE output formats are not supported for code-splitting builds.")
          .into(),
      );
    }
    if merged.sourcemap_file.is_some() {
      return Err(
        invalid_option("\"output.sourcemapFile\" is only supported for single-file builds.")
          .into(),
      );
    }
  }

  Ok(NormalizedOutputOptions {
    format,
    file: merged.file,
    dir: merged.dir,
    entry_filenames: merged.entry_filenames.unwrap_or_else(|| "[name].js".to_string()),
    chunk_filenames: merged.chunk_filenames.unwrap_or_else(|| "[name]-[hash].js".to_string()),
    asset_filenames: merged
      .asset_filenames
      .unwrap_or_else(|| "assets/[name]-[hash][extname]".to_string()),
    sourcemap: merged.sourcemap.unwrap_or_default(),
    sourcemap_file: merged.sourcemap_file,
    globals: merged.globals,
    name: merged.name,
    exports: merged.exports.unwrap_or(OutputExports::Auto),
    banner: merged.banner,
    footer: merged.footer,
    intro: merged.intro,
    outro: merged.outro,
    extend: merged.extend,
    amd_id: merged.amd_id,
  })
}

#[cfg(test)]
mod tests {
  use super::{normalize_input, normalize_output};
  use bindle_common::{InputOptions, OutputOptions};

  fn input(options: InputOptions) -> bindle_common::NormalizedInputOptions {
    futures::executor::block_on(normalize_input(Some(options), &[])).unwrap().options
  }

  #[test]
  fn missing_options_object() {
    let error = futures::executor::block_on(normalize_input(None, &[])).unwrap_err();
    assert!(error.to_string().contains("must supply an options object"));
  }

  #[test]
  fn inline_dynamic_imports_requires_single_entry() {
    let raw = InputOptions {
      input: vec!["a.js".into(), "b.js".into()],
      inline_dynamic_imports: true,
      ..InputOptions::default()
    };
    let error = futures::executor::block_on(normalize_input(Some(raw), &[])).unwrap_err();
    assert!(error.to_string().contains("Multiple inputs are not supported"));
  }

  #[test]
  fn named_input_forbids_file() {
    let normalized = input(InputOptions {
      input: vec![("main", "x.js").into()],
      ..InputOptions::default()
    });
    let raw = OutputOptions {
      format: Some("esm".to_string()),
      file: Some("out.js".to_string()),
      ..OutputOptions::default()
    };
    let error = normalize_output(raw, &normalized, false).unwrap_err();
    assert!(error.to_string().contains("providing named inputs"));
  }

  #[test]
  fn single_entry_list_with_file_is_fine() {
    let normalized = input(InputOptions { input: vec!["x.js".into()], ..InputOptions::default() });
    let raw = OutputOptions {
      format: Some("esm".to_string()),
      file: Some("out.js".to_string()),
      ..OutputOptions::default()
    };
    assert!(normalize_output(raw, &normalized, false).is_ok());
  }

  #[test]
  fn multi_chunk_forbids_umd() {
    let normalized = input(InputOptions { input: vec!["x.js".into()], ..InputOptions::default() });
    let raw = OutputOptions { format: Some("umd".to_string()), ..OutputOptions::default() };
    let error = normalize_output(raw, &normalized, true).unwrap_err();
    assert!(error.to_string().contains("not supported for code-splitting"));
  }

  #[test]
  fn es6_format_is_deprecated() {
    let normalized = input(InputOptions { input: vec!["x.js".into()], ..InputOptions::default() });
    let raw = OutputOptions { format: Some("es6".to_string()), ..OutputOptions::default() };
    let error = normalize_output(raw, &normalized, false).unwrap_err();
    assert!(error.to_string().contains("esm"));
  }
}
