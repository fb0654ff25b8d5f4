//! `${VAR}` / `${VAR:-default}` expansion for string config values.

use crate::ConfigError;

/// Expand environment variable references in a config string.
///
/// `${VAR}` fails with [`ConfigError::EnvVar`] when `VAR` is unset,
/// `${VAR:-default}` falls back to `default`. Bare `$VAR` is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Variable lookup failure carried through `shellexpand`.
struct LookupError {
    var_name: String,
}
