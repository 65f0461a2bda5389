mod plugin;
mod plugin_context;
mod plugin_driver;

pub use crate::{
  plugin::{
    HookAddonReturn, HookGenerateBundleArgs, HookLoadArgs, HookLoadReturn, HookNoopReturn,
    HookOptionsReturn, HookResolveIdArgs, HookResolveIdReturn, HookTransformArgs,
    HookTransformReturn, HookUsage, Plugin, SharedPlugin,
  },
  plugin_context::PluginContext,
  plugin_driver::{PluginAddons, PluginDriver},
};
