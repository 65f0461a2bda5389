use serde_json::Value;

use crate::{InputItem, InputOptions, OutputExports, OutputOptions, SourceMapOption};

const INPUT_OPTION_KEYS: &[&str] = &[
  "input",
  "plugins",
  "cache",
  "cwd",
  "preserveModules",
  "inlineDynamicImports",
  "manualChunks",
  "optimizeChunks",
  "chunkGroupingSize",
  "onwarn",
  "perf",
  "output",
];

/// Builds `InputOptions` from a raw JSON configuration object, the way a
/// config file is ingested. Keys outside the allowed set are collected in
/// `unknown_options` and surface as `UNKNOWN_OPTION` warnings during
/// normalization. Function-valued options (plugins, manualChunks, onwarn)
/// cannot cross a JSON boundary and must be attached programmatically.
pub fn input_options_from_json(value: &Value) -> anyhow::Result<InputOptions> {
  let Value::Object(map) = value else {
    anyhow::bail!("Expected the configuration to be an object, got {value}");
  };

  let mut options = InputOptions::default();

  for (key, entry) in map {
    match key.as_str() {
      "input" => options.input = input_items_from_json(entry)?,
      "cwd" => options.cwd = entry.as_str().map(Into::into),
      "preserveModules" => options.preserve_modules = entry.as_bool().unwrap_or_default(),
      "inlineDynamicImports" => {
        options.inline_dynamic_imports = entry.as_bool().unwrap_or_default();
      }
      "optimizeChunks" => options.optimize_chunks = entry.as_bool().unwrap_or_default(),
      "chunkGroupingSize" => {
        options.chunk_grouping_size = entry.as_u64().map(|size| size as usize);
      }
      "perf" => options.perf = entry.as_bool().unwrap_or_default(),
      "output" => options.output = Some(output_options_from_json(entry)?),
      "plugins" | "cache" | "manualChunks" | "onwarn" => {}
      _ => options.unknown_options.push(key.clone()),
    }
  }

  Ok(options)
}

fn input_items_from_json(value: &Value) -> anyhow::Result<Vec<InputItem>> {
  match value {
    Value::String(single) => Ok(vec![single.as_str().into()]),
    Value::Array(list) => list
      .iter()
      .map(|entry| {
        entry
          .as_str()
          .map(InputItem::from)
          .ok_or_else(|| anyhow::anyhow!("Each input entry must be a string, got {entry}"))
      })
      .collect(),
    Value::Object(named) => named
      .iter()
      .map(|(name, import)| {
        import
          .as_str()
          .map(|import| InputItem { name: Some(name.clone()), import: import.to_string() })
          .ok_or_else(|| anyhow::anyhow!("Named input \"{name}\" must map to a string"))
      })
      .collect(),
    _ => anyhow::bail!("Unexpected shape for the input option: {value}"),
  }
}

fn output_options_from_json(value: &Value) -> anyhow::Result<OutputOptions> {
  let Value::Object(map) = value else {
    anyhow::bail!("Expected output options to be an object, got {value}");
  };

  let mut options = OutputOptions::default();
  for (key, entry) in map {
    match key.as_str() {
      "format" => options.format = entry.as_str().map(Into::into),
      "file" => options.file = entry.as_str().map(Into::into),
      "dir" => options.dir = entry.as_str().map(Into::into),
      "entryFileNames" => options.entry_filenames = entry.as_str().map(Into::into),
      "chunkFileNames" => options.chunk_filenames = entry.as_str().map(Into::into),
      "assetFileNames" => options.asset_filenames = entry.as_str().map(Into::into),
      "sourcemap" => {
        options.sourcemap = match entry {
          Value::Bool(true) => Some(SourceMapOption::File),
          Value::Bool(false) => Some(SourceMapOption::Disabled),
          Value::String(mode) if mode == "inline" => Some(SourceMapOption::Inline),
          _ => None,
        };
      }
      "sourcemapFile" => options.sourcemap_file = entry.as_str().map(Into::into),
      "globals" => {
        if let Value::Object(globals) = entry {
          options.globals = globals
            .iter()
            .filter_map(|(id, name)| name.as_str().map(|name| (id.clone(), name.to_string())))
            .collect();
        }
      }
      "name" => options.name = entry.as_str().map(Into::into),
      "exports" => {
        options.exports = entry.as_str().and_then(|mode| match mode {
          "auto" => Some(OutputExports::Auto),
          "default" => Some(OutputExports::Default),
          "named" => Some(OutputExports::Named),
          "none" => Some(OutputExports::None),
          _ => None,
        });
      }
      "banner" => options.banner = entry.as_str().map(Into::into),
      "footer" => options.footer = entry.as_str().map(Into::into),
      "intro" => options.intro = entry.as_str().map(Into::into),
      "outro" => options.outro = entry.as_str().map(Into::into),
      "extend" => options.extend = entry.as_bool().unwrap_or_default(),
      "amd" => options.amd_id = entry.get("id").and_then(Value::as_str).map(Into::into),
      _ => {}
    }
  }
  Ok(options)
}

#[cfg(test)]
mod tests {
  use super::input_options_from_json;

  #[test]
  fn collects_unknown_keys() {
    let raw = serde_json::json!({
      "input": "src/main.js",
      "plUgins": [],
      "output": { "format": "esm" },
    });
    let options = input_options_from_json(&raw).unwrap();
    assert_eq!(options.unknown_options, vec!["plUgins".to_string()]);
    assert_eq!(options.input.len(), 1);
  }

  #[test]
  fn named_inputs() {
    let raw = serde_json::json!({ "input": { "main": "src/main.js" } });
    let options = input_options_from_json(&raw).unwrap();
    assert_eq!(options.input[0].name.as_deref(), Some("main"));
  }
}
