// src/script.rs
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::core::ConfigurableTarget;

/// Opaque reference to a configuration script, as supplied by the caller.
///
/// What the reference denotes (a path, a URL, a registry key) is the
/// script loader's business; the core only captures and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptRef(String);

impl ScriptRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScriptRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for ScriptRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

/// Sandbox handle for script evaluation.
///
/// Scopes form a tree: loaders derive a child scope per loaded script.
/// Opaque beyond identity and ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationScope {
    id: Uuid,
    parent: Option<Uuid>,
}

impl IsolationScope {
    /// Create a top-level scope.
    pub fn root() -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
        }
    }

    /// Derive a child scope for an isolated load.
    pub fn create_child(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: Some(self.id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    pub fn is_child_of(&self, other: &IsolationScope) -> bool {
        self.parent == Some(other.id)
    }
}

impl fmt::Display for IsolationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A compiled, runnable configuration script.
///
/// The same instance is applied to every target of a run, so
/// implementations must tolerate repeated application to different
/// receivers.
pub trait ScriptPlugin {
    fn apply(&self, target: &mut dyn ConfigurableTarget) -> Result<()>;
}

/// A script plugin together with the child scope it was loaded in.
pub struct LoadedScript {
    pub plugin: Rc<dyn ScriptPlugin>,
    pub scope: IsolationScope,
}

/// Resolves a script reference into a runnable unit.
///
/// Implementations resolve the reference to a source, derive a child of
/// `parent` to sandbox evaluation, and compile the script once. Failures
/// are reported as-is; the core does not rewrap them.
#[cfg_attr(test, automock)]
pub trait ScriptLoader {
    fn load(&self, script: &ScriptRef, parent: &IsolationScope) -> Result<LoadedScript>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_links_to_parent() {
        let root = IsolationScope::root();
        let child = root.create_child();

        assert_eq!(child.parent(), Some(root.id()));
        assert!(child.is_child_of(&root));
        assert!(!root.is_child_of(&child));
        assert_ne!(root.id(), child.id());
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn sibling_scopes_are_distinct() {
        let root = IsolationScope::root();
        let a = root.create_child();
        let b = root.create_child();

        assert_ne!(a.id(), b.id());
        assert!(a.is_child_of(&root));
        assert!(b.is_child_of(&root));
        assert!(!a.is_child_of(&b));
    }

    #[test]
    fn script_ref_exposes_its_reference() {
        let script: ScriptRef = "build/common.cfg".into();

        assert_eq!(script.as_str(), "build/common.cfg");
        assert_eq!(script.to_string(), "build/common.cfg");
        assert_eq!(script, ScriptRef::new(String::from("build/common.cfg")));
    }
}
