//! Shared handler state

use std::sync::{Arc, OnceLock};

use algorithm::SeasonalTrendModel;

use crate::error::ServerError;

/// Holds the served model. Empty until filled, and filled at most once.
///
/// Handlers only ever read it, so there is no locking on the request path.
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    inner: Arc<OnceLock<Arc<SeasonalTrendModel>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that starts out ready.
    pub fn ready(model: SeasonalTrendModel) -> Self {
        Self {
            inner: Arc::new(OnceLock::from(Arc::new(model))),
        }
    }

    pub fn install(&self, model: SeasonalTrendModel) -> Result<(), ServerError> {
        self.inner
            .set(Arc::new(model))
            .map_err(|_| ServerError::AlreadyLoaded)
    }

    pub fn get(&self) -> Option<Arc<SeasonalTrendModel>> {
        self.inner.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// Application state shared across handlers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub model: ModelSlot,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a model already installed.
    pub fn with_model(model: SeasonalTrendModel) -> Self {
        Self {
            model: ModelSlot::ready(model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::SeasonalTrendConfig;

    fn unfitted() -> SeasonalTrendModel {
        SeasonalTrendModel::new(SeasonalTrendConfig::default()).unwrap()
    }

    #[test]
    fn test_slot_starts_unready() {
        let slot = ModelSlot::new();
        assert!(!slot.is_ready());
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_install_once() {
        let slot = ModelSlot::new();
        slot.install(unfitted()).unwrap();
        assert!(slot.is_ready());

        let second = slot.install(unfitted());
        assert!(matches!(second, Err(ServerError::AlreadyLoaded)));
    }

    #[test]
    fn test_with_model_is_ready_and_sealed() {
        let state = AppState::with_model(unfitted());
        assert!(state.model.is_ready());
        assert!(matches!(
            state.model.install(unfitted()),
            Err(ServerError::AlreadyLoaded)
        ));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let state = AppState::new();
        let handle = state.clone();
        state.model.install(unfitted()).unwrap();
        assert!(handle.model.is_ready());
    }
}
