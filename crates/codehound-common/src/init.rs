//! Global initialization utilities for the application

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the application environment
///
/// Loads variables from a `.env` file (current directory or any parent) so a
/// `CODEHOUND_GITHUB_TOKEN` can live outside the shell history. Variables
/// already set in the process environment are never overwritten.
///
/// Safe to call multiple times - will only run once
pub fn initialize_environment() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_environment_is_idempotent() {
        initialize_environment();
        initialize_environment();
        assert!(INIT.is_completed());
    }
}
