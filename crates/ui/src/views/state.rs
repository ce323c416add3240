use dioxus::prelude::*;
use services::ProgressionServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    InvalidInput,
    Storage,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::InvalidInput => "That value is not allowed.",
            ViewError::Storage => "Your progress could not be saved or loaded. Please try again.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&ProgressionServiceError> for ViewError {
    fn from(err: &ProgressionServiceError) -> Self {
        tracing::warn!(error = %err, "progression action failed");
        match err {
            ProgressionServiceError::InvalidAward(_) => ViewError::InvalidInput,
            ProgressionServiceError::Storage(_) => ViewError::Storage,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
