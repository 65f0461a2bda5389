mod bundler;
mod graph;
mod module_loader;
mod stages;
mod utils;

pub(crate) mod types;

pub use crate::{
  bundler::{bundle, Bundler, BundlerBuilder},
  types::bundle_output::BundleOutput,
};
pub use bindle_common::*;
pub use bindle_error::{codes, BuildError, BuildResult, Diagnostic, Warning, WarningHandler};
pub use bindle_plugin::{
  HookGenerateBundleArgs, HookLoadArgs, HookResolveIdArgs, HookTransformArgs, HookUsage, Plugin,
  PluginContext, SharedPlugin,
};
