use std::collections::HashMap;

use tracing::debug;

use crate::error::BindError;
use crate::record::{Bind, Source, walk};
use crate::value::convert;

const TRIMMED: [char; 4] = [' ', '\n', '\r', '\t'];

/// A read-only view of environment variables.
///
/// Injected into the binder so tests can pass synthetic data instead of
/// touching the process environment.
pub trait Environment {
    /// All entries, in listing order.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment, read afresh on every call.
/// Entries that are not valid UTF-8 are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Environment for [(K, V)] {
    fn vars(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> Environment for [(K, V); N] {
    fn vars(&self) -> Vec<(String, String)> {
        self.as_slice().vars()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Environment for Vec<(K, V)> {
    fn vars(&self) -> Vec<(String, String)> {
        self.as_slice().vars()
    }
}

impl Environment for HashMap<String, String> {
    fn vars(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Bind environment variables named `{prefix}{KEY}` onto `record`.
///
/// Keys match exactly. A matching value is trimmed, skipped if empty,
/// lower-cased and converted to the field's type. When several entries share
/// the key, each is applied in listing order and the last one sticks.
///
/// The environment is scanned once per bound field.
pub fn bind_env<R, E>(record: &mut R, prefix: &str, env: &E) -> Result<(), BindError>
where
    R: Bind + ?Sized,
    E: Environment + ?Sized,
{
    walk(record, Source::Env, |binding, mut slot| {
        let kind = slot.require_kind(&binding)?;
        let var_name = format!("{prefix}{}", binding.key());

        for (key, raw) in env.vars() {
            if key != var_name {
                continue;
            }
            let trimmed = raw.trim_matches(TRIMMED);
            if trimmed.is_empty() {
                continue;
            }

            let value = convert(kind, &trimmed.to_lowercase(), binding.key())?;
            debug!(var = %var_name, field = binding.field, %value, "environment overrides field");
            slot.set(value).map_err(|rejected| BindError::LookupMismatch {
                name: var_name.clone(),
                reason: format!("value of kind {:?} does not fit the field", rejected.kind()),
            })?;
        }
        Ok(())
    })
}
