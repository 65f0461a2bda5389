use std::{
  path::Path,
  sync::{Arc, Mutex},
};

use bindle::{
  bundle, BundlerBuilder, InputOptions, Output, OutputOptions, SourceMapOption, Warning,
};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

fn esm() -> OutputOptions {
  OutputOptions { format: Some("esm".to_string()), ..OutputOptions::default() }
}

fn input(dir: &TempDir, entries: &[&str]) -> InputOptions {
  InputOptions {
    input: entries.iter().map(|entry| (*entry).into()).collect(),
    cwd: Some(dir.path().to_path_buf()),
    ..InputOptions::default()
  }
}

fn warning_sink(options: &mut InputOptions) -> Arc<Mutex<Vec<Warning>>> {
  let captured: Arc<Mutex<Vec<Warning>>> = Arc::default();
  let sink = Arc::clone(&captured);
  options.on_warn = Some(Arc::new(move |warning, _default| {
    sink.lock().unwrap().push(warning);
  }));
  captured
}

#[tokio::test]
async fn single_entry_bundles_to_one_chunk() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import { x } from './dep.js';\nconsole.log(x);\n");
  write_file(dir.path(), "dep.js", "export const x = function () {};\n");

  let mut build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  let output = build.generate(esm()).await.unwrap();

  assert_eq!(output.assets.len(), 1);
  let Output::Chunk(chunk) = &output.assets[0] else {
    panic!("expected a chunk");
  };
  assert_eq!(chunk.filename(), "main.js");
  assert!(chunk.is_entry);
  assert!(chunk.code.contains("const x = function () {};"));
  assert!(chunk.code.contains("console.log(x);"));
  assert!(!chunk.code.contains("import"));
  assert!(chunk.code.ends_with('\n'));
}

#[tokio::test]
async fn missing_options_object_rejects() {
  let error = BundlerBuilder::default().bundle().await.unwrap_err();
  assert!(error.to_string().contains("must supply an options object"));
}

#[tokio::test]
async fn unknown_option_warns_but_builds() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(42);\n");

  let raw = serde_json::json!({
    "input": "./main.js",
    "plUgins": [],
  });
  let mut options = bindle::input_options_from_json(&raw).unwrap();
  options.cwd = Some(dir.path().to_path_buf());
  let warnings = warning_sink(&mut options);

  let mut build = bundle(options).await.unwrap();
  let output = build.generate(esm()).await.unwrap();
  assert_eq!(output.assets.len(), 1);

  let warnings = warnings.lock().unwrap();
  assert_eq!(warnings.len(), 1);
  assert_eq!(warnings[0].code, Some("UNKNOWN_OPTION"));
  assert!(warnings[0].message.contains("plUgins"));
}

#[tokio::test]
async fn named_input_with_file_rejects() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let mut options = input(&dir, &[]);
  options.input = vec![("main", "./main.js").into()];
  let mut build = bundle(options).await.unwrap();

  let error = build
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap_err();
  assert!(error
    .to_string()
    .contains("You must set output.dir instead of output.file when providing named inputs."));
  assert!(error.codes().any(|code| code == "INVALID_OPTION"));
}

#[tokio::test]
async fn multiple_entries_with_file_reject() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.js", "console.log(1);\n");
  write_file(dir.path(), "b.js", "console.log(2);\n");

  let mut build = bundle(input(&dir, &["./a.js", "./b.js"])).await.unwrap();
  let error = build
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("generating multiple chunks"));
}

#[tokio::test]
async fn single_entry_list_with_file_succeeds() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.js", "console.log(1);\n");

  let mut build = bundle(input(&dir, &["./a.js"])).await.unwrap();
  let output = build
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap();
  assert_eq!(output.assets[0].filename(), "out.js");
}

#[tokio::test]
async fn preserve_modules_with_file_rejects() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.js", "console.log(1);\n");

  let mut options = input(&dir, &["./a.js"]);
  options.preserve_modules = true;
  let mut build = bundle(options).await.unwrap();

  let error = build
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("preserveModules"));
}

#[tokio::test]
async fn dynamic_import_with_file_rejects_unless_inlined() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import('./lazy.js');\n");
  write_file(dir.path(), "lazy.js", "export const lazy = 1;\n");

  let mut build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  let error = build
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("generating multiple chunks"));

  let mut options = input(&dir, &["./main.js"]);
  options.inline_dynamic_imports = true;
  let mut inlined = bundle(options).await.unwrap();
  let output = inlined
    .generate(OutputOptions { file: Some("out.js".to_string()), ..esm() })
    .await
    .unwrap();
  assert_eq!(output.assets.len(), 1);
}

#[tokio::test]
async fn es6_format_rejects_with_esm_hint() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.js", "console.log(1);\n");

  let mut build = bundle(input(&dir, &["./a.js"])).await.unwrap();
  let error = build
    .generate(OutputOptions { format: Some("es6".to_string()), ..OutputOptions::default() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("deprecated"));
  assert!(error.to_string().contains("esm"));
}

#[tokio::test]
async fn write_without_file_or_dir_rejects() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a.js", "console.log(1);\n");

  let mut build = bundle(input(&dir, &["./a.js"])).await.unwrap();
  let error = build.write(esm()).await.unwrap_err();
  assert!(error.to_string().contains("You must specify output.file"));
}

#[tokio::test]
async fn two_entries_shared_dep_and_dynamic_chunk_layout() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main1.js", "import { shared } from './dep.js';\nconsole.log(shared);\n");
  write_file(dir.path(), "main2.js", "import { shared } from './dep.js';\nshared();\n");
  write_file(dir.path(), "dep.js", "export const shared = () => import('./dyndep.js');\n");
  write_file(dir.path(), "dyndep.js", "export const dyn = 1;\n");

  let mut build = bundle(input(&dir, &["./main1.js", "./main2.js"])).await.unwrap();
  let output = build.generate(esm()).await.unwrap();

  let names: Vec<&str> = output.assets.iter().map(Output::filename).collect();
  assert_eq!(names.len(), 4);
  assert_eq!(&names[..2], &["main1.js", "main2.js"]);
  assert_eq!(names[2], "dyndep.js");
  assert!(names[3].starts_with("chunk-"));
  assert!(names[3].ends_with(".js"));

  // The shared chunk is imported by both entries, the dynamic chunk is
  // reached through a rewritten import().
  let Output::Chunk(main1) = &output.assets[0] else { panic!() };
  assert!(main1.code.contains(&format!("from './{}';", names[3])));
  let Output::Chunk(shared) = &output.assets[3] else { panic!() };
  assert!(shared.code.contains("import('./dyndep.js')"));
}

#[tokio::test]
async fn colliding_entry_names_stay_unique() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "a/main.js", "console.log(1);\n");
  write_file(dir.path(), "b/main.js", "console.log(2);\n");

  let mut build = bundle(input(&dir, &["./a/main.js", "./b/main.js"])).await.unwrap();
  let output = build.generate(esm()).await.unwrap();

  let names: Vec<&str> = output.assets.iter().map(Output::filename).collect();
  assert_eq!(names.len(), 2);
  assert_ne!(names[0], names[1]);
  assert!(names.contains(&"main.js"));
}

#[tokio::test]
async fn repeated_generates_are_structurally_equal() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import { x } from './dep.js';\nconsole.log(x);\n");
  write_file(dir.path(), "dep.js", "export const x = 1;\n");

  let mut build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  let first = build.generate(esm()).await.unwrap();
  let second = build.generate(esm()).await.unwrap();

  let first_names: Vec<String> =
    first.assets.iter().map(|asset| asset.filename().to_string()).collect();
  let second_names: Vec<String> =
    second.assets.iter().map(|asset| asset.filename().to_string()).collect();
  assert_eq!(first_names, second_names);
}

#[tokio::test]
async fn optimizer_runs_at_most_once_per_handle() {
  let dir = TempDir::new().unwrap();
  write_file(
    dir.path(),
    "e1.js",
    "import { a } from './dep1.js';\nimport { b } from './dep2.js';\nconsole.log(a, b);\n",
  );
  write_file(
    dir.path(),
    "e2.js",
    "import { a } from './dep1.js';\nimport { b } from './dep2.js';\nconsole.log(b, a);\n",
  );
  write_file(dir.path(), "e3.js", "import { b } from './dep2.js';\nconsole.log(b);\n");
  write_file(dir.path(), "dep1.js", "export const a = 'tiny';\n");
  write_file(dir.path(), "dep2.js", "export const b = 'tiny too';\n");

  let mut options = input(&dir, &["./e1.js", "./e2.js", "./e3.js"]);
  options.optimize_chunks = true;
  let mut build = bundle(options).await.unwrap();

  let first = build.generate(esm()).await.unwrap();
  let second = build.generate(esm()).await.unwrap();

  // dep1 is reachable from a strict subset of the entries that reach dep2,
  // so its tiny chunk folds into dep2's on the first generate. The second
  // generate sees the already-optimized chunk list and does not re-run the
  // pass.
  let first_names: Vec<&str> = first.assets.iter().map(Output::filename).collect();
  let second_names: Vec<&str> = second.assets.iter().map(Output::filename).collect();
  assert_eq!(first_names.len(), 4);
  assert_eq!(first_names, second_names);
}

#[tokio::test]
async fn write_persists_chunks_with_external_sourcemap() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "export const answer = 42;\n");

  let mut build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  build
    .write(OutputOptions {
      dir: Some("dist".to_string()),
      sourcemap: Some(SourceMapOption::File),
      ..esm()
    })
    .await
    .unwrap();

  let code = std::fs::read_to_string(dir.path().join("dist/main.js")).unwrap();
  assert!(code.ends_with("//# sourceMappingURL=main.js.map\n"));
  let map = std::fs::read_to_string(dir.path().join("dist/main.js.map")).unwrap();
  assert!(map.contains("\"mappings\""));
}

#[tokio::test]
async fn cjs_output_uses_exports_object() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "export const x = 1;\nexport default x;\n");

  let mut options = input(&dir, &["./main.js"]);
  let warnings = warning_sink(&mut options);
  let mut build = bundle(options).await.unwrap();
  let output =
    build.generate(OutputOptions { format: Some("cjs".to_string()), ..OutputOptions::default() }).await.unwrap();

  let Output::Chunk(chunk) = &output.assets[0] else { panic!() };
  assert!(chunk.code.starts_with("'use strict';"));
  assert!(chunk.code.contains("exports.x = x;"));

  // Mixed named and default exports surface the MIXED_EXPORTS notice.
  assert!(warnings.lock().unwrap().iter().any(|w| w.code == Some("MIXED_EXPORTS")));
}

#[tokio::test]
async fn umd_without_global_name_warns_once() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import _ from 'lodash';\nexport const wrapped = _;\n");

  let mut options = input(&dir, &["./main.js"]);
  let warnings = warning_sink(&mut options);
  let mut build = bundle(options).await.unwrap();
  build
    .generate(OutputOptions {
      format: Some("umd".to_string()),
      name: Some("Wrapped".to_string()),
      ..OutputOptions::default()
    })
    .await
    .unwrap();

  let warnings = warnings.lock().unwrap();
  let missing: Vec<_> =
    warnings.iter().filter(|w| w.code == Some("MISSING_GLOBAL_NAME")).collect();
  assert_eq!(missing.len(), 1);
  assert!(missing[0].message.contains("'lodash'"));
}

#[tokio::test]
async fn umd_with_exports_requires_name() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "export const x = 1;\n");

  let mut build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  let error = build
    .generate(OutputOptions { format: Some("umd".to_string()), ..OutputOptions::default() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("You must supply output.name for UMD bundles"));
}

#[tokio::test]
async fn preserve_modules_emits_one_chunk_per_module() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "src/main.js", "import { x } from './dep.js';\nconsole.log(x);\n");
  write_file(dir.path(), "src/dep.js", "export const x = 1;\n");

  let mut options = input(&dir, &["./src/main.js"]);
  options.preserve_modules = true;
  let mut build = bundle(options).await.unwrap();
  let output =
    build.generate(OutputOptions { dir: Some("dist".to_string()), ..esm() }).await.unwrap();

  let mut names: Vec<&str> = output.assets.iter().map(Output::filename).collect();
  names.sort_unstable();
  assert_eq!(names, vec!["dep.js", "main.js"]);
}

#[tokio::test]
async fn handle_exposes_cache_and_watch_files() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import './dep.js';\n");
  write_file(dir.path(), "dep.js", "console.log('side effect');\n");

  let build = bundle(input(&dir, &["./main.js"])).await.unwrap();
  let cache = build.cache().expect("cache is on by default");
  assert_eq!(cache.modules.len(), 2);
  assert_eq!(build.watch_files().len(), 2);

  let mut options = input(&dir, &["./main.js"]);
  options.cache = bindle::CacheOption::Disabled;
  let uncached = bundle(options).await.unwrap();
  assert!(uncached.cache().is_none());
}

#[tokio::test]
async fn perf_flag_arms_timings() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let mut options = input(&dir, &["./main.js"]);
  options.perf = true;
  let mut build = bundle(options).await.unwrap();
  build.generate(esm()).await.unwrap();

  let timings = build.timings().expect("timings present under perf");
  assert!(timings.iter().any(|(label, _)| label == "build"));
  assert!(timings.iter().any(|(label, _)| label == "generate"));

  let unarmed = bundle(input(&dir, &["./main.js"])).await.unwrap();
  assert!(unarmed.timings().is_none());
}
