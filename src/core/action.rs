// src/core/action.rs
use std::any::TypeId;
use std::rc::Rc;

use tracing::{debug, info};

use crate::error::{ConfitError, ConfitResult};
use crate::script::{IsolationScope, ScriptLoader, ScriptRef};

use super::plugin::{Plugin, PluginApplication, PluginRef, PostApplyHook};
use super::target::{TargetHandle, TargetSet};

/// A pending configuration step, captured at registration time and
/// dispatched during [`ConfigurationAction::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    ApplyScript(ScriptRef),
    ApplyPluginByType {
        type_id: TypeId,
        type_name: &'static str,
    },
    ApplyPluginById(String),
}

/// Deferred configurator: collects targets and pending operations in
/// any order, then applies every operation to every target in a single
/// synchronous pass.
///
/// The action is single-use; [`ConfigurationAction::execute`] consumes
/// it.
pub struct ConfigurationAction {
    script_loader: Rc<dyn ScriptLoader>,
    scope: IsolationScope,
    post_apply: PostApplyHook,
    default_targets: Vec<TargetHandle>,
    targets: TargetSet,
    targets_explicit: bool,
    operations: Vec<Operation>,
}

impl ConfigurationAction {
    /// Create an action with a no-op post-apply hook.
    pub fn new(
        script_loader: Rc<dyn ScriptLoader>,
        scope: IsolationScope,
        default_targets: impl IntoIterator<Item = TargetHandle>,
    ) -> Self {
        Self::with_post_apply(script_loader, scope, |_| {}, default_targets)
    }

    /// Create an action whose hook is invoked once per successful
    /// (plugin, target) application.
    pub fn with_post_apply(
        script_loader: Rc<dyn ScriptLoader>,
        scope: IsolationScope,
        post_apply: impl Fn(&PluginApplication) + 'static,
        default_targets: impl IntoIterator<Item = TargetHandle>,
    ) -> Self {
        Self {
            script_loader,
            scope,
            post_apply: Box::new(post_apply),
            default_targets: default_targets.into_iter().collect(),
            targets: TargetSet::new(),
            targets_explicit: false,
            operations: Vec::new(),
        }
    }

    /// Add targets to configure. Duplicate handles are collapsed and
    /// first-seen order is kept. Calling `to` at all, even with nothing
    /// to add, opts out of the default-target fallback.
    pub fn to(mut self, targets: impl IntoIterator<Item = TargetHandle>) -> Self {
        self.targets_explicit = true;
        for target in targets {
            self.targets.insert(target);
        }
        self
    }

    /// Queue application of a script.
    #[allow(clippy::should_implement_trait)]
    pub fn from(mut self, script: impl Into<ScriptRef>) -> Self {
        let script = script.into();
        debug!("Queueing script {}", script);
        self.push(Operation::ApplyScript(script));
        self
    }

    /// Queue application of the plugin type `P`.
    pub fn plugin<P: Plugin + 'static>(mut self) -> Self {
        let type_name = std::any::type_name::<P>();
        debug!("Queueing plugin type '{}'", type_name);
        self.push(Operation::ApplyPluginByType {
            type_id: TypeId::of::<P>(),
            type_name,
        });
        self
    }

    /// Queue application of the plugin registered under `id`.
    pub fn plugin_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        debug!("Queueing plugin id '{}'", id);
        self.push(Operation::ApplyPluginById(id));
        self
    }

    fn push(&mut self, operation: Operation) {
        if !self.operations.contains(&operation) {
            self.operations.push(operation);
        }
    }

    /// Run every queued operation against every target, in registration
    /// order. If no target was ever supplied, the default targets are
    /// used. The first failure aborts the pass, leaving everything
    /// applied so far in place.
    pub fn execute(mut self) -> ConfitResult<()> {
        if !self.targets_explicit {
            debug!(
                "No explicit targets, falling back to {} default target(s)",
                self.default_targets.len()
            );
            let defaults = std::mem::take(&mut self.default_targets);
            for target in defaults {
                self.targets.insert(target);
            }
        }

        info!(
            "Executing {} operation(s) against {} target(s)",
            self.operations.len(),
            self.targets.len()
        );
        let operations = std::mem::take(&mut self.operations);
        for operation in operations {
            match operation {
                Operation::ApplyScript(script) => self.apply_script(&script)?,
                Operation::ApplyPluginByType { type_id, type_name } => {
                    self.apply_plugin(&PluginRef::Type { type_id, type_name })?
                }
                Operation::ApplyPluginById(id) => self.apply_plugin(&PluginRef::Id(id))?,
            }
        }
        Ok(())
    }

    fn apply_script(&self, script: &ScriptRef) -> ConfitResult<()> {
        debug!("Loading script {} under scope {}", script, self.scope);
        let loaded = self
            .script_loader
            .load(script, &self.scope)
            .map_err(|e| ConfitError::Script(e.into()))?;
        for handle in self.targets.iter() {
            let mut target = handle.borrow_mut();
            debug!("Applying script {} to '{}'", script, target.display_name());
            loaded
                .plugin
                .apply(&mut *target)
                .map_err(|e| ConfitError::Script(e.into()))?;
        }
        Ok(())
    }

    fn apply_plugin(&self, spec: &PluginRef) -> ConfitResult<()> {
        for handle in self.targets.iter() {
            let applied = {
                let mut target = handle.borrow_mut();
                match target.as_plugin_aware() {
                    Some(aware) => {
                        aware
                            .apply_plugin(spec)
                            .map_err(|e| ConfitError::PluginApplication {
                                plugin: spec.clone(),
                                source: e.into(),
                            })?
                    }
                    None => {
                        return Err(ConfitError::UnsupportedTarget {
                            plugin: spec.clone(),
                            target: target.display_name(),
                            kind: target.kind(),
                        });
                    }
                }
            };
            (self.post_apply)(&PluginApplication {
                plugin: applied,
                target: handle.clone(),
            });
        }
        Ok(())
    }
}
