use bindle_common::{InputOptions, NormalizedOutputOptions, OutputBundle, OutputChunk};
use bindle_error::{BuildError, Warning};
use futures::future::{try_join_all, BoxFuture};

use crate::{
  plugin::{
    HookLoadArgs, HookResolveIdArgs, HookTransformArgs, HookUsage, SharedPlugin,
  },
  plugin_context::PluginContext,
  HookGenerateBundleArgs,
};

/// Concatenated banner/footer/intro/outro contributions for one generate
/// call: the output option strings plus everything the plugins add.
#[derive(Debug, Default, Clone)]
pub struct PluginAddons {
  pub banner: Vec<String>,
  pub footer: Vec<String>,
  pub intro: Vec<String>,
  pub outro: Vec<String>,
}

/// Drives the ordered plugin list in one of three modes: parallel (start
/// all, await all), sequential (declaration order, each awaited) and
/// first-non-empty (declaration order until a hook yields a value).
pub struct PluginDriver {
  plugins: Vec<SharedPlugin>,
  context: PluginContext,
}

impl PluginDriver {
  pub fn new(plugins: Vec<SharedPlugin>, context: PluginContext) -> Self {
    Self { plugins, context }
  }

  pub fn context(&self) -> &PluginContext {
    &self.context
  }

  fn registered(&self, usage: HookUsage) -> impl Iterator<Item = &SharedPlugin> {
    self.plugins.iter().filter(move |plugin| plugin.register_hook_usage().contains(usage))
  }

  // --- The three dispatch modes.

  /// Starts the hook of every registered plugin at once and awaits them
  /// all; any failure rejects the aggregate. No ordering between plugins.
  pub async fn hook_parallel<'me, F>(&'me self, usage: HookUsage, f: F) -> anyhow::Result<()>
  where
    F: Fn(&'me PluginContext, &'me SharedPlugin) -> BoxFuture<'me, anyhow::Result<()>>,
  {
    try_join_all(self.registered(usage).map(|plugin| f(&self.context, plugin))).await?;
    Ok(())
  }

  /// Awaits each registered plugin's hook in declaration order.
  pub async fn hook_seq<'me, F>(&'me self, usage: HookUsage, f: F) -> anyhow::Result<()>
  where
    F: Fn(&'me PluginContext, &'me SharedPlugin) -> BoxFuture<'me, anyhow::Result<()>>,
  {
    for plugin in self.registered(usage) {
      f(&self.context, plugin).await?;
    }
    Ok(())
  }

  /// Declaration order until a hook returns a value; exhaustion yields
  /// `None`.
  pub async fn hook_first<'me, R, F>(
    &'me self,
    usage: HookUsage,
    f: F,
  ) -> anyhow::Result<Option<R>>
  where
    F: Fn(&'me PluginContext, &'me SharedPlugin) -> BoxFuture<'me, anyhow::Result<Option<R>>>,
  {
    for plugin in self.registered(usage) {
      if let Some(value) = f(&self.context, plugin).await? {
        return Ok(Some(value));
      }
    }
    Ok(None)
  }

  // --- Typed dispatchers used by the build pipeline.

  /// Runs the `options` chain; each plugin may replace the configuration
  /// handed to the next.
  pub async fn options(&self, mut options: InputOptions) -> anyhow::Result<InputOptions> {
    for plugin in self.registered(HookUsage::Options) {
      if let Some(replaced) = plugin.options(&options).await? {
        options = replaced;
      }
    }
    Ok(options)
  }

  pub async fn build_start(&self) -> anyhow::Result<()> {
    self.hook_parallel(HookUsage::BuildStart, |ctx, plugin| plugin.build_start(ctx)).await
  }

  pub async fn build_end(&self, error: Option<&BuildError>) -> anyhow::Result<()> {
    try_join_all(
      self.registered(HookUsage::BuildEnd).map(|plugin| plugin.build_end(&self.context, error)),
    )
    .await?;
    Ok(())
  }

  pub async fn resolve_id(
    &self,
    specifier: &str,
    importer: Option<&str>,
  ) -> anyhow::Result<Option<String>> {
    let args = HookResolveIdArgs { specifier, importer };
    for plugin in self.registered(HookUsage::ResolveId) {
      if let Some(resolved) = plugin.resolve_id(&self.context, &args).await? {
        return Ok(Some(resolved));
      }
    }
    Ok(None)
  }

  pub async fn load(&self, id: &str) -> anyhow::Result<Option<String>> {
    let args = HookLoadArgs { id };
    for plugin in self.registered(HookUsage::Load) {
      if let Some(code) = plugin.load(&self.context, &args).await? {
        return Ok(Some(code));
      }
    }
    Ok(None)
  }

  /// Sequential; each plugin sees the code the previous one produced.
  pub async fn transform(&self, id: &str, mut code: String) -> anyhow::Result<String> {
    for plugin in self.registered(HookUsage::Transform) {
      let args = HookTransformArgs { id, code: &code };
      if let Some(transformed) = plugin.transform(&self.context, &args).await? {
        code = transformed;
      }
    }
    Ok(code)
  }

  pub async fn render_start(&self) -> anyhow::Result<()> {
    self.hook_parallel(HookUsage::RenderStart, |ctx, plugin| plugin.render_start(ctx)).await
  }

  /// Warns once per generate call for every plugin still registering the
  /// deprecated `on_generate` hook.
  pub fn warn_deprecated_hooks(&self) {
    for (index, plugin) in self.plugins.iter().enumerate() {
      if plugin.register_hook_usage().contains(HookUsage::OnGenerate) {
        self.context.warn(
          Warning::new(format!(
            "The ongenerate hook used by the plugin at position {} is deprecated. The generateBundle hook should be used instead.",
            index + 1
          ))
          .with_code(bindle_error::codes::PLUGIN_WARNING)
          .with_plugin_code(bindle_error::codes::ONGENERATE_HOOK_DEPRECATED),
        );
      }
    }
  }

  pub async fn addons(&self) -> anyhow::Result<PluginAddons> {
    let mut addons = PluginAddons::default();
    let (banner, footer, intro, outro) = futures::future::try_join4(
      try_join_all(self.registered(HookUsage::Banner).map(|p| p.banner(&self.context))),
      try_join_all(self.registered(HookUsage::Footer).map(|p| p.footer(&self.context))),
      try_join_all(self.registered(HookUsage::Intro).map(|p| p.intro(&self.context))),
      try_join_all(self.registered(HookUsage::Outro).map(|p| p.outro(&self.context))),
    )
    .await?;
    addons.banner = banner.into_iter().flatten().collect();
    addons.footer = footer.into_iter().flatten().collect();
    addons.intro = intro.into_iter().flatten().collect();
    addons.outro = outro.into_iter().flatten().collect();
    Ok(addons)
  }

  pub async fn on_generate(&self, chunk: &OutputChunk) -> anyhow::Result<()> {
    try_join_all(
      self.registered(HookUsage::OnGenerate).map(|plugin| plugin.on_generate(&self.context, chunk)),
    )
    .await?;
    Ok(())
  }

  pub async fn render_error(&self, error: &BuildError) -> anyhow::Result<()> {
    try_join_all(
      self
        .registered(HookUsage::RenderError)
        .map(|plugin| plugin.render_error(&self.context, error)),
    )
    .await?;
    Ok(())
  }

  /// Sequential; `ctx` is the generate-scoped context whose asset emissions
  /// only live for the current call.
  pub async fn generate_bundle(
    &self,
    ctx: &PluginContext,
    options: &NormalizedOutputOptions,
    bundle: &mut OutputBundle,
    is_write: bool,
  ) -> anyhow::Result<()> {
    for plugin in self.registered(HookUsage::GenerateBundle) {
      let mut args = HookGenerateBundleArgs { options, bundle, is_write };
      plugin.generate_bundle(ctx, &mut args).await?;
    }
    Ok(())
  }

  pub async fn on_write(&self, chunk: &OutputChunk) -> anyhow::Result<()> {
    for plugin in self.registered(HookUsage::OnWrite) {
      plugin.on_write(&self.context, chunk).await?;
    }
    Ok(())
  }
}

impl std::fmt::Debug for PluginDriver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PluginDriver").field("plugins", &self.plugins.len()).finish_non_exhaustive()
  }
}
