pub mod core;
pub mod error;
pub mod script;

// Re-export main types for easier access
pub use crate::core::{
    handle, AppliedPlugin, ConfigurableTarget, ConfigurationAction, Plugin, PluginApplication,
    PluginAware, PluginDescriptor, PluginRef, PluginRegistry, PostApplyHook, TargetHandle,
    TargetSet,
};
pub use crate::error::{BoxError, ConfitError, ConfitResult};
pub use crate::script::{IsolationScope, LoadedScript, ScriptLoader, ScriptPlugin, ScriptRef};
