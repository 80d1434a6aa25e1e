use rfd::{MessageButtons, MessageDialog, MessageLevel};

use crate::usecase::ports::errors::FetchError;
use crate::usecase::ports::reporter::ErrorReporter;

fn log_fetch_error(error: &FetchError) {
    match error {
        FetchError::Source { message, detail } => log::error!("{message}: {detail}"),
        other => log::error!("{other}"),
    }
}

/// Reports failures to the log only.
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &FetchError) {
        log_fetch_error(error);
    }
}

/// Logs the failure and shows the user-facing message in a dialog.
pub struct DialogReporter {
    pub title: String,
}

impl ErrorReporter for DialogReporter {
    fn report(&self, error: &FetchError) {
        log_fetch_error(error);
        let description = error.to_string();
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(self.title.as_str())
            .set_description(description.as_str())
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
