// src/core/target.rs
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use super::plugin::PluginAware;

/// An object that can be handed to the configuration engine.
///
/// Anything can be a target; plugin application additionally requires
/// the target to opt in through [`ConfigurableTarget::as_plugin_aware`].
pub trait ConfigurableTarget: Any {
    /// Human-readable form used in log output and error messages.
    fn display_name(&self) -> String;

    /// Concrete kind of the target, usually `std::any::type_name`.
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Capability probe: targets that accept plugins return themselves.
    fn as_plugin_aware(&mut self) -> Option<&mut dyn PluginAware> {
        None
    }
}

/// Shared single-threaded handle to a target.
pub type TargetHandle = Rc<RefCell<dyn ConfigurableTarget>>;

/// Wrap a value into a [`TargetHandle`].
pub fn handle<T: ConfigurableTarget>(value: T) -> TargetHandle {
    Rc::new(RefCell::new(value))
}

/// Insertion-ordered set of targets, deduplicated by handle identity.
///
/// Array-backed; membership is a linear scan.
#[derive(Default)]
pub struct TargetSet {
    items: Vec<TargetHandle>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target, keeping first-seen order. Returns false if the
    /// same handle is already present.
    pub fn insert(&mut self, target: TargetHandle) -> bool {
        if self.items.iter().any(|t| Rc::ptr_eq(t, &target)) {
            return false;
        }
        self.items.push(target);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetHandle> {
        self.items.iter()
    }
}
