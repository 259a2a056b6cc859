mod action;
mod plugin;
mod registry;
mod target;

pub use action::ConfigurationAction;
pub use plugin::{
    AppliedPlugin, Plugin, PluginApplication, PluginAware, PluginDescriptor, PluginRef,
    PostApplyHook,
};
pub use registry::PluginRegistry;
pub use target::{handle, ConfigurableTarget, TargetHandle, TargetSet};
