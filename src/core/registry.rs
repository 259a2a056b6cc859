// src/core/registry.rs
use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::{ConfitError, ConfitResult};

use super::plugin::{AppliedPlugin, Plugin, PluginRef};
use super::target::ConfigurableTarget;

/// Holds the plugins a host makes available, keyed by string id and by
/// concrete type.
///
/// Plugin-aware targets typically hold a shared registry and implement
/// their plugin-host surface by delegating to [`PluginRegistry::apply_to`].
#[derive(Default)]
pub struct PluginRegistry {
    by_id: HashMap<String, Rc<dyn Plugin>>,
    by_type: HashMap<TypeId, Rc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under `id` and under its concrete type.
    pub fn register<P: Plugin + 'static>(&mut self, id: impl Into<String>, plugin: P) {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            warn!("Plugin '{}' is already registered, overriding", id);
        }
        let plugin: Rc<dyn Plugin> = Rc::new(plugin);
        self.by_id.insert(id.clone(), plugin.clone());
        self.by_type.insert(TypeId::of::<P>(), plugin);
        debug!("Registered plugin '{}'", id);
    }

    /// Resolve a captured plugin identity to the registered instance.
    pub fn resolve(&self, spec: &PluginRef) -> ConfitResult<Rc<dyn Plugin>> {
        let found = match spec {
            PluginRef::Type { type_id, .. } => self.by_type.get(type_id),
            PluginRef::Id(id) => self.by_id.get(id),
        };
        found
            .cloned()
            .ok_or_else(|| ConfitError::PluginNotFound(spec.clone()))
    }

    /// Resolve `spec` and apply it to `target`, producing the handle
    /// the post-apply hook will see.
    pub fn apply_to(
        &self,
        spec: &PluginRef,
        target: &mut dyn ConfigurableTarget,
    ) -> Result<AppliedPlugin> {
        let plugin = self.resolve(spec)?;
        debug!("Applying plugin {} to '{}'", spec, target.display_name());
        plugin.apply(target)?;
        Ok(AppliedPlugin::new(spec.clone(), plugin))
    }

    /// Check if a plugin id is registered.
    pub fn has_plugin(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Registered ids, in no particular order.
    pub fn plugin_ids(&self) -> Vec<String> {
        self.by_id.keys().cloned().collect()
    }

    /// Get the number of registered plugins.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use anyhow::anyhow;

    use crate::core::plugin::PluginDescriptor;

    use super::*;

    struct Workspace {
        labels: Vec<String>,
    }

    impl Workspace {
        fn new() -> Self {
            Self { labels: Vec::new() }
        }
    }

    impl ConfigurableTarget for Workspace {
        fn display_name(&self) -> String {
            "workspace".to_string()
        }

        fn kind(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Labeler {
        descriptor: PluginDescriptor,
        label: String,
    }

    impl Labeler {
        fn new(label: &str, version: &str) -> Self {
            Self {
                descriptor: PluginDescriptor {
                    name: "labeler".to_string(),
                    description: "labels a workspace".to_string(),
                    version: version.to_string(),
                },
                label: label.to_string(),
            }
        }
    }

    impl Plugin for Labeler {
        fn descriptor(&self) -> &PluginDescriptor {
            &self.descriptor
        }

        fn apply(&self, target: &mut dyn ConfigurableTarget) -> Result<()> {
            let workspace = target
                .as_any_mut()
                .downcast_mut::<Workspace>()
                .ok_or_else(|| anyhow!("labeler only applies to workspaces"))?;
            workspace.labels.push(self.label.clone());
            Ok(())
        }
    }

    #[test]
    fn resolves_by_id_and_by_type() {
        let mut registry = PluginRegistry::new();
        registry.register("labeler", Labeler::new("x", "1"));

        assert!(registry.resolve(&PluginRef::id("labeler")).is_ok());
        assert!(registry.resolve(&PluginRef::of::<Labeler>()).is_ok());
    }

    #[test]
    fn unknown_plugin_reports_not_found() {
        let registry = PluginRegistry::new();

        let err = registry.resolve(&PluginRef::id("nope")).unwrap_err();
        assert!(matches!(err, ConfitError::PluginNotFound(_)));
        assert!(err.to_string().contains("id 'nope'"));
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = PluginRegistry::new();
        registry.register("labeler", Labeler::new("x", "1"));
        registry.register("labeler", Labeler::new("x", "2"));

        let plugin = registry.resolve(&PluginRef::id("labeler")).unwrap();
        assert_eq!(plugin.descriptor().version, "2");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn apply_to_applies_and_reports_the_application() {
        let mut registry = PluginRegistry::new();
        registry.register("labeler", Labeler::new("managed", "1"));
        let mut workspace = Workspace::new();

        let spec = PluginRef::id("labeler");
        let applied = registry.apply_to(&spec, &mut workspace).unwrap();

        assert_eq!(workspace.labels, ["managed"]);
        assert_eq!(applied.reference(), &spec);
        assert_eq!(applied.descriptor().name, "labeler");
    }

    struct Dummy;

    impl ConfigurableTarget for Dummy {
        fn display_name(&self) -> String {
            "dummy".to_string()
        }

        fn kind(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn plugin_failure_surfaces_from_apply_to() {
        let mut registry = PluginRegistry::new();
        registry.register("labeler", Labeler::new("x", "1"));
        let mut not_a_workspace = Dummy;

        let err = registry
            .apply_to(&PluginRef::id("labeler"), &mut not_a_workspace)
            .unwrap_err();
        assert!(err.to_string().contains("only applies to workspaces"));
    }

    #[test]
    fn introspection_reflects_registrations() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());

        registry.register("labeler", Labeler::new("x", "1"));

        assert!(registry.has_plugin("labeler"));
        assert!(!registry.has_plugin("other"));
        assert_eq!(registry.plugin_ids(), ["labeler"]);
        assert_eq!(registry.len(), 1);
    }
}
