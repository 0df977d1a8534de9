//! Command-line binding on top of clap's builder API.
//!
//! Binding runs in three strictly ordered phases:
//!
//! 1. **Registration**: walk the record and register one clap argument per
//!    command-line binding. The field's current value becomes the argument's
//!    default, so help output shows what a flag would leave in place.
//! 2. **Parse**: parse the argument list. Any error aborts the bind before
//!    a single field is touched.
//! 3. **Read-back**: walk the record again, look every binding up *by name*
//!    in the registry built during phase 1, and assign values that actually
//!    came from the command line.
//!
//! Flags are accepted as `-intval 11`, `-bool` or `--strval=x`. A single
//! dash followed by a multi-letter name is rewritten to `--name` before clap
//! sees it.

use std::collections::BTreeMap;
use std::ffi::OsStr;

use clap::builder::{BoolishValueParser, TypedValueParser, ValueParser};
use clap::error::ErrorKind;
use clap::parser::{MatchesError, ValueSource};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, trace};

use crate::error::BindError;
use crate::record::{Bind, Binding, Source, walk};
use crate::value::{Kind, Value, parse_int_seq, strip_quotes};

/// A reusable command-line parsing context.
///
/// Holds a clap [`Command`] template. Every bind starts from a fresh clone of
/// the template, so one `FlagSet` can bind several times.
#[derive(Debug, Clone)]
pub struct FlagSet {
    template: Command,
    command: Option<Command>,
    registered: BTreeMap<String, Kind>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_command(Command::new(name.into()))
    }

    /// Use an existing clap command as the template. Arguments it already
    /// defines are kept, and bindings may not reuse their names.
    pub fn from_command(command: Command) -> Self {
        Self {
            template: command.no_binary_name(true).args_override_self(true),
            command: None,
            registered: BTreeMap::new(),
        }
    }

    /// Whether `name` was registered by the last bind (aliases included).
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Help text for the flags registered by the last bind.
    pub fn render_help(&mut self) -> String {
        self.command
            .as_mut()
            .unwrap_or(&mut self.template)
            .render_help()
            .to_string()
    }
}

/// Bind command-line `args` (without the program name) onto `record`.
pub fn bind_flags<R, I, S>(record: &mut R, flags: &mut FlagSet, args: I) -> Result<(), BindError>
where
    R: Bind + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    flags.registered.clear();
    flags.command = None;

    let template = &flags.template;
    let registered = &mut flags.registered;
    let mut new_args = Vec::new();

    walk(record, Source::Cmd, |binding, slot| {
        let kind = slot.require_kind(&binding)?;
        for name in &binding.names {
            if template_defines(template, name) || registered.insert(name.clone(), kind).is_some()
            {
                return Err(BindError::DuplicateFlag(name.clone()));
            }
        }
        trace!(flag = binding.key(), field = binding.field, ?kind, "registering flag");
        new_args.push(flag_arg(&binding, kind, slot.get()));
        Ok(())
    })?;

    let mut command = flags.template.clone().args(new_args);
    let args = normalize_args(args.into_iter().map(Into::into), &flags.registered);
    let parsed = command.try_get_matches_from_mut(args);
    flags.command = Some(command);
    let matches = parsed?;

    let registered = &flags.registered;
    walk(record, Source::Cmd, |binding, mut slot| {
        let name = binding.key();
        let Some(&kind) = registered.get(name) else {
            return Err(BindError::LookupMismatch {
                name: name.to_string(),
                reason: "flag was never registered".into(),
            });
        };
        if slot.kind() != Some(kind) {
            return Err(BindError::LookupMismatch {
                name: name.to_string(),
                reason: format!("registered as {kind:?}, field is {}", slot.type_name()),
            });
        }

        if matches.value_source(name) != Some(ValueSource::CommandLine) {
            return Ok(());
        }
        let Some(value) = read_value(&matches, name, kind)? else {
            return Ok(());
        };

        debug!(flag = name, field = binding.field, %value, "command line overrides field");
        slot.set(value).map_err(|rejected| BindError::LookupMismatch {
            name: name.to_string(),
            reason: format!("value of kind {:?} does not fit the field", rejected.kind()),
        })
    })
}

/// Arguments the template already has, including the `help` and `version`
/// flags clap only adds once the command is built.
fn template_defines(template: &Command, name: &str) -> bool {
    let generated = match name {
        "help" => !template.is_disable_help_flag_set(),
        "version" => template.get_version().is_some() && !template.is_disable_version_flag_set(),
        _ => false,
    };
    generated
        || template
            .get_arguments()
            .any(|arg| arg.get_id().as_str() == name || arg.get_long() == Some(name))
}

fn flag_arg(binding: &Binding, kind: Kind, current: Option<Value>) -> Arg {
    let name = binding.key().to_string();
    let mut arg = Arg::new(name.clone())
        .long(name.clone())
        .value_name(kind.placeholder())
        .value_parser(value_parser(kind))
        .action(ArgAction::Set);

    if let Some(short) = single_char(&name) {
        arg = arg.short(short);
    }
    if !binding.aliases().is_empty() {
        arg = arg
            .visible_aliases(binding.aliases().to_vec())
            .visible_short_aliases(binding.aliases().iter().filter_map(|a| single_char(a)));
    }
    if !binding.usage.is_empty() {
        arg = arg.help(binding.usage.clone());
    }
    match kind {
        Kind::Bool => arg = arg.num_args(0..=1).default_missing_value("true"),
        Kind::Int | Kind::Int64 => arg = arg.allow_negative_numbers(true),
        // `-inf` is a float but not a negative number to clap
        Kind::Str | Kind::Float | Kind::IntSeq => arg = arg.allow_hyphen_values(true),
    }
    if let Some(current) = current.map(|value| value.to_string())
        && !current.is_empty()
    {
        arg = arg.default_value(current);
    }
    arg
}

/// One-letter names also get a short flag, except `h` which belongs to help.
fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() && c != 'h' => Some(c),
        _ => None,
    }
}

fn value_parser(kind: Kind) -> ValueParser {
    match kind {
        Kind::Str => ValueParser::string(),
        Kind::Int => clap::value_parser!(i32).into(),
        Kind::Int64 => clap::value_parser!(i64).into(),
        Kind::Bool => ValueParser::new(BoolishValueParser::new()),
        Kind::Float => clap::value_parser!(f64).into(),
        Kind::IntSeq => ValueParser::new(IntSeqParser),
    }
}

/// Accepts `4,5,6` and yields `vec![4, 5, 6]`.
#[derive(Debug, Clone, Copy)]
struct IntSeqParser;

impl TypedValueParser for IntSeqParser {
    type Value = Vec<i32>;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        parse_int_seq(raw).map_err(|e| {
            let flag = arg.map(Arg::to_string).unwrap_or_else(|| "...".to_string());
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value '{raw}' for '{flag}': {e}\n"),
            )
            .with_cmd(cmd)
        })
    }
}

fn read_value(matches: &ArgMatches, name: &str, kind: Kind) -> Result<Option<Value>, BindError> {
    let mismatch = |e: MatchesError| BindError::LookupMismatch {
        name: name.to_string(),
        reason: e.to_string(),
    };

    let value = match kind {
        Kind::Str => matches
            .try_get_one::<String>(name)
            .map_err(mismatch)?
            .map(|s| Value::Str(strip_quotes(s).to_string())),
        Kind::Int => matches
            .try_get_one::<i32>(name)
            .map_err(mismatch)?
            .map(|v| Value::Int(*v)),
        Kind::Int64 => matches
            .try_get_one::<i64>(name)
            .map_err(mismatch)?
            .map(|v| Value::Int64(*v)),
        Kind::Bool => matches
            .try_get_one::<bool>(name)
            .map_err(mismatch)?
            .map(|v| Value::Bool(*v)),
        Kind::Float => matches
            .try_get_one::<f64>(name)
            .map_err(mismatch)?
            .map(|v| Value::Float(*v)),
        Kind::IntSeq => matches
            .try_get_one::<Vec<i32>>(name)
            .map_err(mismatch)?
            .map(|v| Value::IntSeq(v.clone())),
    };
    Ok(value)
}

/// Rewrite `-name` to `--name`. One-letter flags, negative numbers, the
/// value following a registered non-bool flag and everything after a bare
/// `--` are left alone.
fn normalize_args(
    args: impl IntoIterator<Item = String>,
    registered: &BTreeMap<String, Kind>,
) -> Vec<String> {
    let mut out = Vec::new();
    let mut terminated = false;
    let mut value_next = false;

    for arg in args {
        if terminated || value_next {
            value_next = false;
            out.push(arg);
            continue;
        }
        if arg == "--" {
            terminated = true;
            out.push(arg);
            continue;
        }
        let Some(flag) = arg.strip_prefix('-') else {
            out.push(arg);
            continue;
        };
        let double = flag.strip_prefix('-');
        let name = double.unwrap_or(flag).split('=').next().unwrap_or("");
        value_next =
            !flag.contains('=') && registered.get(name).is_some_and(|kind| *kind != Kind::Bool);

        let is_long = double.is_none()
            && name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.chars().count() > 1;
        if is_long {
            out.push(format!("-{arg}"));
        } else {
            out.push(arg);
        }
    }
    out
}
