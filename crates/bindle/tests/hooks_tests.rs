use std::{
  borrow::Cow,
  path::Path,
  sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bindle::{
  BuildError, BundlerBuilder, HookGenerateBundleArgs, HookLoadArgs, HookResolveIdArgs,
  HookTransformArgs, HookUsage, InputOptions, Output, OutputOptions, Plugin, PluginContext,
  SharedPlugin, Warning,
};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) {
  std::fs::write(dir.join(name), content).unwrap();
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

type EventLog = Arc<Mutex<Vec<String>>>;

/// Records every hook invocation; individual tests pick which hooks it
/// registers.
#[derive(Debug)]
struct RecordingPlugin {
  events: EventLog,
  usage: HookUsage,
}

impl RecordingPlugin {
  fn shared(events: &EventLog, usage: HookUsage) -> Option<SharedPlugin> {
    Some(Arc::new(Self { events: Arc::clone(events), usage }))
  }

  fn record(&self, event: impl Into<String>) {
    self.events.lock().unwrap().push(event.into());
  }
}

#[async_trait]
impl Plugin for RecordingPlugin {
  fn name(&self) -> Cow<'static, str> {
    "recording".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    self.usage
  }

  async fn build_start(&self, _ctx: &PluginContext) -> anyhow::Result<()> {
    self.record("build_start");
    Ok(())
  }

  async fn build_end(&self, _ctx: &PluginContext, error: Option<&BuildError>) -> anyhow::Result<()> {
    self.record(if error.is_some() { "build_end:error" } else { "build_end:ok" });
    Ok(())
  }

  async fn render_start(&self, _ctx: &PluginContext) -> anyhow::Result<()> {
    self.record("render_start");
    Ok(())
  }

  async fn render_error(&self, _ctx: &PluginContext, _error: &BuildError) -> anyhow::Result<()> {
    self.record("render_error");
    Ok(())
  }

  async fn generate_bundle(
    &self,
    _ctx: &PluginContext,
    args: &mut HookGenerateBundleArgs<'_>,
  ) -> anyhow::Result<()> {
    self.record(format!("generate_bundle:is_write={}", args.is_write));
    Ok(())
  }

  async fn on_write(&self, _ctx: &PluginContext, chunk: &bindle::OutputChunk) -> anyhow::Result<()> {
    self.record(format!("on_write:{}", chunk.filename()));
    Ok(())
  }
}

#[tokio::test]
async fn lifecycle_hooks_fire_in_order() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let events: EventLog = Arc::default();
  let plugin = RecordingPlugin::shared(
    &events,
    HookUsage::BuildStart
      | HookUsage::BuildEnd
      | HookUsage::RenderStart
      | HookUsage::GenerateBundle
      | HookUsage::OnWrite,
  );

  let mut build = BundlerBuilder::default()
    .with_options(input(&dir, &["./main.js"]))
    .with_plugins(vec![plugin, None])
    .bundle()
    .await
    .unwrap();
  build.write(OutputOptions { dir: Some("dist".to_string()), ..esm() }).await.unwrap();

  let events = events.lock().unwrap();
  assert_eq!(
    events.as_slice(),
    &[
      "build_start".to_string(),
      "build_end:ok".to_string(),
      "render_start".to_string(),
      "generate_bundle:is_write=true".to_string(),
      "on_write:main.js".to_string(),
    ]
  );
}

#[tokio::test]
async fn build_end_observes_the_build_error_once() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "import { gone } from './missing.js';\n");

  let events: EventLog = Arc::default();
  let plugin =
    RecordingPlugin::shared(&events, HookUsage::BuildStart | HookUsage::BuildEnd);

  let result = BundlerBuilder::default()
    .with_options(input(&dir, &["./main.js"]))
    .with_plugins(vec![plugin])
    .bundle()
    .await;
  assert!(result.is_err());

  let events = events.lock().unwrap();
  assert_eq!(events.iter().filter(|event| *event == "build_end:error").count(), 1);
}

#[tokio::test]
async fn render_error_fires_before_the_failure_propagates() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "export const x = 1;\n");

  let events: EventLog = Arc::default();
  let plugin = RecordingPlugin::shared(
    &events,
    HookUsage::RenderStart | HookUsage::RenderError | HookUsage::GenerateBundle,
  );

  let mut build = BundlerBuilder::default()
    .with_options(input(&dir, &["./main.js"]))
    .with_plugins(vec![plugin])
    .bundle()
    .await
    .unwrap();

  // An iife bundle with exports but no name fails during render.
  let error = build
    .generate(OutputOptions { format: Some("iife".to_string()), ..OutputOptions::default() })
    .await
    .unwrap_err();
  assert!(error.to_string().contains("output.name for IIFE"));

  let events = events.lock().unwrap();
  assert_eq!(events.as_slice(), &["render_start".to_string(), "render_error".to_string()]);
}

#[derive(Debug)]
struct OnGeneratePlugin;

#[async_trait]
impl Plugin for OnGeneratePlugin {
  fn name(&self) -> Cow<'static, str> {
    "legacy".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::OnGenerate
  }
}

#[derive(Debug)]
struct NoopPlugin;

#[async_trait]
impl Plugin for NoopPlugin {
  fn name(&self) -> Cow<'static, str> {
    "noop".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::empty()
  }
}

#[tokio::test]
async fn ongenerate_deprecation_names_the_plugin_position() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let mut options = input(&dir, &["./main.js"]);
  let captured: Arc<Mutex<Vec<Warning>>> = Arc::default();
  let sink = Arc::clone(&captured);
  options.on_warn = Some(Arc::new(move |warning, _default| {
    sink.lock().unwrap().push(warning);
  }));

  let mut build = BundlerBuilder::default()
    .with_options(options)
    .with_plugins(vec![Some(Arc::new(NoopPlugin)), Some(Arc::new(OnGeneratePlugin))])
    .bundle()
    .await
    .unwrap();
  build.generate(esm()).await.unwrap();

  let warnings = captured.lock().unwrap();
  let deprecations: Vec<_> =
    warnings.iter().filter(|w| w.code == Some("PLUGIN_WARNING")).collect();
  assert_eq!(deprecations.len(), 1);
  assert_eq!(deprecations[0].plugin_code, Some("ONGENERATE_HOOK_DEPRECATED"));
  assert!(deprecations[0].message.contains("position 2"));
}

/// Serves a virtual entry straight from resolve/load/transform hooks.
#[derive(Debug)]
struct VirtualEntryPlugin;

#[async_trait]
impl Plugin for VirtualEntryPlugin {
  fn name(&self) -> Cow<'static, str> {
    "virtual-entry".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::ResolveId | HookUsage::Load | HookUsage::Transform
  }

  async fn resolve_id(
    &self,
    _ctx: &PluginContext,
    args: &HookResolveIdArgs<'_>,
  ) -> anyhow::Result<Option<String>> {
    Ok((args.specifier == "virtual-entry").then(|| "\u{0}virtual".to_string()))
  }

  async fn load(
    &self,
    _ctx: &PluginContext,
    args: &HookLoadArgs<'_>,
  ) -> anyhow::Result<Option<String>> {
    Ok((args.id == "\u{0}virtual").then(|| "export const marker = 'raw';\n".to_string()))
  }

  async fn transform(
    &self,
    _ctx: &PluginContext,
    args: &HookTransformArgs<'_>,
  ) -> anyhow::Result<Option<String>> {
    Ok(Some(args.code.replace("'raw'", "'transformed'")))
  }
}

#[tokio::test]
async fn virtual_modules_flow_through_resolve_load_transform() {
  let mut build = BundlerBuilder::default()
    .with_options(InputOptions {
      input: vec!["virtual-entry".into()],
      cwd: Some(std::env::temp_dir()),
      ..InputOptions::default()
    })
    .with_plugins(vec![Some(Arc::new(VirtualEntryPlugin))])
    .bundle()
    .await
    .unwrap();

  let output = build.generate(esm()).await.unwrap();
  let Output::Chunk(chunk) = &output.assets[0] else { panic!() };
  assert!(chunk.code.contains("const marker = 'transformed';"));
  assert!(chunk.code.contains("export { marker };"));
}

/// Emits one asset per generate call from the generate_bundle hook.
#[derive(Debug)]
struct AssetEmitterPlugin;

#[async_trait]
impl Plugin for AssetEmitterPlugin {
  fn name(&self) -> Cow<'static, str> {
    "asset-emitter".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::GenerateBundle
  }

  async fn generate_bundle(
    &self,
    ctx: &PluginContext,
    _args: &mut HookGenerateBundleArgs<'_>,
  ) -> anyhow::Result<()> {
    let reference_id = ctx.emit_asset("greeting.txt", Some("hello".into()));
    assert_eq!(reference_id.len(), 8);
    Ok(())
  }
}

#[tokio::test]
async fn generate_bundle_assets_are_scoped_to_one_call() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let mut build = BundlerBuilder::default()
    .with_options(input(&dir, &["./main.js"]))
    .with_plugins(vec![Some(Arc::new(AssetEmitterPlugin))])
    .bundle()
    .await
    .unwrap();

  let first = build.generate(esm()).await.unwrap();
  let second = build.generate(esm()).await.unwrap();

  for output in [&first, &second] {
    let assets: Vec<_> = output
      .assets
      .iter()
      .filter(|entry| matches!(entry, Output::Asset(_)))
      .collect();
    assert_eq!(assets.len(), 1, "emissions must not accumulate across calls");
    // Assets sort after every chunk.
    assert!(matches!(output.assets.last().unwrap(), Output::Asset(_)));
    assert!(assets[0].filename().starts_with("assets/greeting-"));
  }
}

#[derive(Debug, thiserror::Error)]
#[error("boom")]
struct MarkerError;

#[derive(Debug)]
struct FailingBuildStartPlugin;

#[async_trait]
impl Plugin for FailingBuildStartPlugin {
  fn name(&self) -> Cow<'static, str> {
    "failing".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::BuildStart
  }

  async fn build_start(&self, _ctx: &PluginContext) -> anyhow::Result<()> {
    Err(anyhow::Error::new(MarkerError))
  }
}

#[tokio::test]
async fn plugin_errors_keep_their_identity() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "main.js", "console.log(1);\n");

  let error = BundlerBuilder::default()
    .with_options(input(&dir, &["./main.js"]))
    .with_plugins(vec![Some(Arc::new(FailingBuildStartPlugin))])
    .bundle()
    .await
    .unwrap_err();

  assert_eq!(error.len(), 1);
  let original = error.iter().next().unwrap();
  assert!(original.downcast_ref::<MarkerError>().is_some(), "error must not be wrapped");
}

#[derive(Debug)]
struct OptionsRewritePlugin {
  replacement_entry: String,
}

#[async_trait]
impl Plugin for OptionsRewritePlugin {
  fn name(&self) -> Cow<'static, str> {
    "options-rewrite".into()
  }

  fn register_hook_usage(&self) -> HookUsage {
    HookUsage::Options
  }

  async fn options(&self, options: &InputOptions) -> anyhow::Result<Option<InputOptions>> {
    let mut replaced = options.clone();
    replaced.input = vec![self.replacement_entry.as_str().into()];
    Ok(Some(replaced))
  }
}

#[tokio::test]
async fn options_hook_can_replace_the_configuration() {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "real.js", "export const real = true;\n");

  let mut build = BundlerBuilder::default()
    .with_options(InputOptions {
      input: vec!["./does-not-exist.js".into()],
      cwd: Some(dir.path().to_path_buf()),
      ..InputOptions::default()
    })
    .with_plugins(vec![Some(Arc::new(OptionsRewritePlugin {
      replacement_entry: "./real.js".to_string(),
    }))])
    .bundle()
    .await
    .unwrap();

  let output = build.generate(esm()).await.unwrap();
  assert_eq!(output.assets[0].filename(), "real.js");
}
