//! Configuration validation
//!
//! Rejects settings the recipe cannot build before any build side effects.

use crate::core::error::RecipeError;
use crate::core::settings::Settings;

/// Compiler serd's waf setup cannot drive
pub const UNSUPPORTED_COMPILER: &str = "Visual Studio";

/// Fail with `InvalidConfiguration` for the unsupported compiler.
pub fn validate(settings: &Settings) -> Result<(), RecipeError> {
    if settings.compiler.name == UNSUPPORTED_COMPILER {
        return Err(RecipeError::InvalidConfiguration(
            "Don't know how to setup WAF for VS.".to_string(),
        ));
    }
    Ok(())
}
