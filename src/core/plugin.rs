// src/core/plugin.rs
use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::target::{ConfigurableTarget, TargetHandle};

/// Descriptive metadata a plugin reports about itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// A unit of configuration logic applied to one target at a time.
pub trait Plugin {
    /// Get plugin metadata.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Apply this plugin to `target`. A run applies the same instance
    /// to every target, so this must tolerate repeated invocation
    /// against different receivers.
    fn apply(&self, target: &mut dyn ConfigurableTarget) -> Result<()>;
}

/// Identity of a plugin as captured at registration time: either a
/// concrete Rust type or a string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluginRef {
    Type {
        type_id: TypeId,
        type_name: &'static str,
    },
    Id(String),
}

impl PluginRef {
    /// Identity of the plugin type `P`.
    pub fn of<P: Plugin + 'static>() -> Self {
        PluginRef::Type {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
        }
    }

    /// Identity of the plugin registered under `id`.
    pub fn id(id: impl Into<String>) -> Self {
        PluginRef::Id(id.into())
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginRef::Type { type_name, .. } => write!(f, "type '{type_name}'"),
            PluginRef::Id(id) => write!(f, "id '{id}'"),
        }
    }
}

/// Capability exposed by targets that accept plugins.
///
/// This is the plugin-host surface: resolve the requested plugin and
/// apply it to this target, reporting what was applied. Targets
/// typically delegate to a shared [`super::PluginRegistry`].
pub trait PluginAware {
    fn apply_plugin(&mut self, spec: &PluginRef) -> Result<AppliedPlugin>;
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("descriptor", self.descriptor())
            .finish()
    }
}

/// Handle to a successfully applied plugin.
#[derive(Clone)]
pub struct AppliedPlugin {
    reference: PluginRef,
    instance: Rc<dyn Plugin>,
}

impl fmt::Debug for AppliedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppliedPlugin")
            .field("reference", &self.reference)
            .field("instance", &self.instance)
            .finish()
    }
}

impl AppliedPlugin {
    pub fn new(reference: PluginRef, instance: Rc<dyn Plugin>) -> Self {
        Self {
            reference,
            instance,
        }
    }

    /// The identity the plugin was requested under.
    pub fn reference(&self) -> &PluginRef {
        &self.reference
    }

    pub fn instance(&self) -> &Rc<dyn Plugin> {
        &self.instance
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        self.instance.descriptor()
    }
}

/// A successful (plugin, target) application, handed to the post-apply
/// hook.
pub struct PluginApplication {
    pub plugin: AppliedPlugin,
    pub target: TargetHandle,
}

/// Hook invoked once per successful plugin application.
pub type PostApplyHook = Box<dyn Fn(&PluginApplication)>;
