use std::sync::Arc;

use services::ProgressionService;

/// What the composition root hands to the UI.
pub trait UiApp: Send + Sync {
    fn progression(&self) -> Arc<ProgressionService>;
}

#[derive(Clone)]
pub struct AppContext {
    progression: Arc<ProgressionService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            progression: app.progression(),
        }
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
