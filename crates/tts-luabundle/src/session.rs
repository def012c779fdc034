//! Scoped ownership of a running [`BundleEngine`].

use crate::engine::BundleEngine;
use crate::error::{BundleError, Result};
use std::fmt;

/// RAII guard around a started engine.
///
/// The engine is started when the session is opened and shut down exactly
/// once: either explicitly through [`close`](Self::close), which reports
/// teardown errors, or when the session is dropped on any other exit path,
/// in which case teardown errors are logged.
pub struct EngineSession<E: BundleEngine> {
    engine: Option<E>,
}

impl<E: BundleEngine> EngineSession<E> {
    /// Starts `engine` and takes ownership of it.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if it fails to start. The engine is not
    /// shut down in that case since it never ran.
    pub fn open(mut engine: E) -> Result<Self> {
        engine.start()?;
        Ok(Self {
            engine: Some(engine),
        })
    }

    /// Returns the running engine.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::EngineNotRunning`] after the session was closed.
    pub fn engine(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(BundleError::EngineNotRunning)
    }

    /// Shuts the engine down and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if teardown fails.
    pub fn close(mut self) -> Result<()> {
        match self.engine.take() {
            Some(mut engine) => engine.shutdown(),
            None => Ok(()),
        }
    }
}

impl<E: BundleEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Err(e) = engine.shutdown() {
                tracing::warn!("Failed to shut down bundle engine: {}", e);
            } else {
                tracing::debug!("Shut down bundle engine on drop");
            }
        }
    }
}

impl<E: BundleEngine> fmt::Debug for EngineSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("running", &self.engine.is_some())
            .finish()
    }
}
