use crate::env::{Environment, ProcessEnv, bind_env};
use crate::error::BindError;
use crate::flags::{FlagSet, bind_flags};
use crate::record::Bind;

/// Apply command-line `args`, then the process environment, onto `record`.
///
/// `args` must not include the program name. Environment keys are looked up
/// as `{prefix}{KEY}`. Whatever `record` held before the call (defaults, file
/// values) survives for every field neither source sets.
///
/// On error, fields already written by a completed pass are not rolled back.
pub fn unmarshal<R, I, S>(
    record: &mut R,
    prefix: &str,
    flags: &mut FlagSet,
    args: I,
) -> Result<(), BindError>
where
    R: Bind + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    unmarshal_with_env(record, prefix, flags, args, &ProcessEnv)
}

/// Like [`unmarshal`], with an explicit environment.
pub fn unmarshal_with_env<R, I, S, E>(
    record: &mut R,
    prefix: &str,
    flags: &mut FlagSet,
    args: I,
    env: &E,
) -> Result<(), BindError>
where
    R: Bind + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
    E: Environment + ?Sized,
{
    bind_flags(record, flags, args)?;
    bind_env(record, prefix, env)
}
