use crate::usecase::ports::errors::FetchError;

/// User-visible reporting of failed fetches.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &FetchError);
}
