use thiserror::Error;

use crate::core::PluginRef;

/// Boxed error carrying a collaborator failure without rewriting it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ConfitError {
    #[error("Cannot apply plugin {plugin} to '{target}' (kind: {kind}) as it does not implement PluginAware")]
    UnsupportedTarget {
        plugin: PluginRef,
        target: String,
        kind: &'static str,
    },

    #[error("Failed to apply plugin {plugin}")]
    PluginApplication {
        plugin: PluginRef,
        #[source]
        source: BoxError,
    },

    #[error("No plugin registered for {0}")]
    PluginNotFound(PluginRef),

    #[error(transparent)]
    Script(BoxError),
}

pub type ConfitResult<T> = std::result::Result<T, ConfitError>;
