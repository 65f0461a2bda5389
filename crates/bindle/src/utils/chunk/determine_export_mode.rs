use bindle_common::{ExportItem, ModuleId, NormalizedOutputOptions, OutputExports};
use bindle_error::{codes, Warning, WarningHandler};

/// Resolves `output.exports` for an entry chunk. `auto` picks the mode from
/// the entry's actual export surface, warning when named and default exports
/// are mixed.
pub fn determine_export_mode(
  warn: &WarningHandler,
  entry_id: &ModuleId,
  exports: &[ExportItem],
  options: &NormalizedOutputOptions,
) -> anyhow::Result<OutputExports> {
  let has_default = exports.iter().any(|export| export.exported == "default");

  match options.exports {
    OutputExports::Named => Ok(OutputExports::Named),
    OutputExports::None => Ok(OutputExports::None),
    OutputExports::Default => {
      if exports.len() != 1 || !has_default {
        anyhow::bail!(
          "\"default\" was specified for output.exports, but entry module {entry_id} has the following exports: {}",
          exports.iter().map(|export| export.exported.as_str()).collect::<Vec<_>>().join(", ")
        );
      }
      Ok(OutputExports::Default)
    }
    OutputExports::Auto => {
      if exports.is_empty() {
        Ok(OutputExports::None)
      } else if exports.len() == 1 && has_default {
        Ok(OutputExports::Default)
      } else {
        if has_default {
          warn(
            Warning::new(format!(
              "Entry module {entry_id} is using named and default exports together. Consumers of your bundle will have to use bundle['default'] to access the default export, which may not be what you want. Use `output.exports: 'named'` to disable this warning",
            ))
            .with_code(codes::MIXED_EXPORTS),
          );
        }
        Ok(OutputExports::Named)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::determine_export_mode;
  use bindle_common::{
    ExportItem, ModuleId, NormalizedOutputOptions, OutputExports, OutputFormat, SourceMapOption,
  };
  use bindle_error::WarningHandler;
  use std::sync::{Arc, Mutex};

  fn options(exports: OutputExports) -> NormalizedOutputOptions {
    NormalizedOutputOptions {
      format: OutputFormat::Cjs,
      file: None,
      dir: None,
      entry_filenames: "[name].js".to_string(),
      chunk_filenames: "[name]-[hash].js".to_string(),
      asset_filenames: "assets/[name]-[hash][extname]".to_string(),
      sourcemap: SourceMapOption::Disabled,
      sourcemap_file: None,
      globals: Default::default(),
      name: None,
      exports,
      banner: None,
      footer: None,
      intro: None,
      outro: None,
      extend: false,
      amd_id: None,
    }
  }

  fn export(name: &str) -> ExportItem {
    ExportItem { exported: name.to_string(), local: name.to_string() }
  }

  #[test]
  fn auto_picks_mode_from_surface() {
    let sink: Arc<Mutex<Vec<String>>> = Arc::default();
    let captured = Arc::clone(&sink);
    let warn: WarningHandler =
      Arc::new(move |warning| captured.lock().unwrap().push(warning.message));
    let id = ModuleId::from("/src/main.js");

    let mode = determine_export_mode(&warn, &id, &[], &options(OutputExports::Auto)).unwrap();
    assert_eq!(mode, OutputExports::None);

    let mode =
      determine_export_mode(&warn, &id, &[export("default")], &options(OutputExports::Auto))
        .unwrap();
    assert_eq!(mode, OutputExports::Default);

    let mode = determine_export_mode(
      &warn,
      &id,
      &[export("default"), export("x")],
      &options(OutputExports::Auto),
    )
    .unwrap();
    assert_eq!(mode, OutputExports::Named);
    assert_eq!(sink.lock().unwrap().len(), 1);
  }

  #[test]
  fn explicit_default_requires_single_default_export() {
    let warn: WarningHandler = Arc::new(|_| {});
    let id = ModuleId::from("/src/main.js");
    let error =
      determine_export_mode(&warn, &id, &[export("x")], &options(OutputExports::Default))
        .unwrap_err();
    assert!(error.to_string().contains("output.exports"));
  }
}
