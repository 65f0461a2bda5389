use std::{borrow::Cow, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use bindle_common::{InputOptions, NormalizedOutputOptions, OutputBundle, OutputChunk};
use bindle_error::BuildError;

use crate::plugin_context::PluginContext;

pub type SharedPlugin = Arc<dyn Plugin>;

pub type HookNoopReturn = anyhow::Result<()>;
pub type HookOptionsReturn = anyhow::Result<Option<InputOptions>>;
pub type HookResolveIdReturn = anyhow::Result<Option<String>>;
pub type HookLoadReturn = anyhow::Result<Option<String>>;
pub type HookTransformReturn = anyhow::Result<Option<String>>;
pub type HookAddonReturn = anyhow::Result<Option<String>>;

#[derive(Debug)]
pub struct HookResolveIdArgs<'a> {
  pub specifier: &'a str,
  pub importer: Option<&'a str>,
}

#[derive(Debug)]
pub struct HookLoadArgs<'a> {
  pub id: &'a str,
}

#[derive(Debug)]
pub struct HookTransformArgs<'a> {
  pub id: &'a str,
  pub code: &'a str,
}

pub struct HookGenerateBundleArgs<'a> {
  pub options: &'a NormalizedOutputOptions,
  pub bundle: &'a mut OutputBundle,
  pub is_write: bool,
}

bitflags::bitflags! {
  /// Which hooks a plugin actually implements. The driver dispatches by
  /// registration, never by probing.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct HookUsage: u32 {
    const Options = 1;
    const BuildStart = 1 << 1;
    const ResolveId = 1 << 2;
    const Load = 1 << 3;
    const Transform = 1 << 4;
    const BuildEnd = 1 << 5;
    const RenderStart = 1 << 6;
    const Banner = 1 << 7;
    const Footer = 1 << 8;
    const Intro = 1 << 9;
    const Outro = 1 << 10;
    const OnGenerate = 1 << 11;
    const RenderError = 1 << 12;
    const GenerateBundle = 1 << 13;
    const OnWrite = 1 << 14;
  }
}

/// A record of optional hook implementations. Every hook has a no-op
/// default; a plugin declares the ones it carries via `register_hook_usage`.
#[async_trait]
pub trait Plugin: Debug + Send + Sync {
  fn name(&self) -> Cow<'static, str>;

  fn register_hook_usage(&self) -> HookUsage;

  /// May return a replacement input configuration; `None` leaves the
  /// current one untouched.
  async fn options(&self, _options: &InputOptions) -> HookOptionsReturn {
    Ok(None)
  }

  async fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    Ok(())
  }

  async fn resolve_id(
    &self,
    _ctx: &PluginContext,
    _args: &HookResolveIdArgs<'_>,
  ) -> HookResolveIdReturn {
    Ok(None)
  }

  async fn load(&self, _ctx: &PluginContext, _args: &HookLoadArgs<'_>) -> HookLoadReturn {
    Ok(None)
  }

  async fn transform(
    &self,
    _ctx: &PluginContext,
    _args: &HookTransformArgs<'_>,
  ) -> HookTransformReturn {
    Ok(None)
  }

  /// Runs whether the build succeeded or failed; `error` carries the
  /// failure in the latter case.
  async fn build_end(&self, _ctx: &PluginContext, _error: Option<&BuildError>) -> HookNoopReturn {
    Ok(())
  }

  async fn render_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    Ok(())
  }

  async fn banner(&self, _ctx: &PluginContext) -> HookAddonReturn {
    Ok(None)
  }

  async fn footer(&self, _ctx: &PluginContext) -> HookAddonReturn {
    Ok(None)
  }

  async fn intro(&self, _ctx: &PluginContext) -> HookAddonReturn {
    Ok(None)
  }

  async fn outro(&self, _ctx: &PluginContext) -> HookAddonReturn {
    Ok(None)
  }

  /// Deprecated in favor of `generate_bundle`; registering it produces a
  /// `PLUGIN_WARNING` naming the plugin position.
  async fn on_generate(&self, _ctx: &PluginContext, _chunk: &OutputChunk) -> HookNoopReturn {
    Ok(())
  }

  /// Observes a generate failure; the original error is rethrown afterwards.
  async fn render_error(&self, _ctx: &PluginContext, _error: &BuildError) -> HookNoopReturn {
    Ok(())
  }

  async fn generate_bundle(
    &self,
    _ctx: &PluginContext,
    _args: &mut HookGenerateBundleArgs<'_>,
  ) -> HookNoopReturn {
    Ok(())
  }

  async fn on_write(&self, _ctx: &PluginContext, _chunk: &OutputChunk) -> HookNoopReturn {
    Ok(())
  }
}
