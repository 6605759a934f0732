use core::fmt::{Debug, Display};

/// General error type in the module system.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Custom error thrown by a module.
    #[error(transparent)]
    ModuleError(#[from] anyhow::Error),
}

impl Error {
    /// Returns the typed error a module raised, if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        match self {
            Error::ModuleError(err) => err.downcast_ref::<E>(),
        }
    }
}
