mod progress_vm;
mod time_fmt;

pub use progress_vm::{ProgressVm, sign_in_message};
