//! Bind command-line flags and environment variables onto a typed
//! configuration record.
//!
//! Declare the record once, tag each field with where it may come from, and
//! let cfgbind fill it in:
//!
//! ```ignore
//! use cfgbind::{Bind, FlagSet, unmarshal};
//!
//! #[derive(Bind, Default)]
//! struct Config {
//!     #[bind(cmd = "intval|integer value", env = "INTVAL")]
//!     int_val: i32,
//!
//!     #[bind(nested)]
//!     data: Data,
//! }
//!
//! #[derive(Bind, Default)]
//! struct Data {
//!     #[bind(cmd = "float|how to use float", env = "FL64")]
//!     fl64: f64,
//! }
//!
//! let mut config = Config::default();
//! let mut flags = FlagSet::new("myapp");
//! unmarshal(&mut config, "MYAPP_", &mut flags, std::env::args().skip(1))?;
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Record defaults       whatever the caller put there
//!        ↑ overridden by
//! Config file           serde-decoded TOML or JSON (optional)
//!        ↑ overridden by
//! Command line          -name value, --name=value
//!        ↑ overridden by
//! Environment           {PREFIX}{KEY}
//! ```
//!
//! Every layer is sparse: a field keeps its value unless a higher layer
//! actually sets it. Flags that were not passed and environment variables
//! that are absent or empty never overwrite anything.
//!
//! # Declaring bindings
//!
//! `#[derive(Bind)]` reads one attribute per field:
//!
//! - **`cmd = "name|usage"`** binds a command-line flag. Usage text is
//!   optional. `"name,alias|usage"` adds aliases; one-letter names also get a
//!   short flag.
//! - **`env = "KEY"`** binds the environment variable `{prefix}KEY`.
//! - **`nested`** recurses into a field that is itself a record. Nested
//!   records have no bindings of their own, only their leaves do.
//!
//! Fields without `#[bind]` are never touched. Records can also implement
//! [`Bind`] by hand, listing their fields through a [`Visitor`].
//!
//! # Supported field types
//!
//! | Type       | Command line                  | Environment                          |
//! |------------|-------------------------------|--------------------------------------|
//! | `String`   | surrounding quotes stripped   | stored lower-cased                   |
//! | `i32`      | decimal                       | decimal                              |
//! | `i64`      | decimal                       | decimal                              |
//! | `bool`     | `true`/`false`, `t`/`f`, `1`/`0`, `yes`/`no`, `on`/`off` (any case), bare flag = true | `true`/`yes`/`on`/`1` true, else false |
//! | `f64`      | decimal                       | decimal                              |
//! | `Vec<i32>` | `4,5,6`                       | `4,5,6`                              |
//!
//! Binding a field of any other type fails at bind time with
//! [`BindError::UnsupportedField`].
//!
//! Environment values are trimmed and lower-cased before conversion, string
//! fields included. Bind case-sensitive strings from the command line or the
//! config file instead.
//!
//! # Command line
//!
//! Parsing is done by [clap](https://docs.rs/clap). Flags may be written
//! with a single dash (`-intval 11`); they are rewritten to the
//! double-dash form first. A [`FlagSet`] wraps the clap command and can be
//! reused across binds. Its help output lists every bound flag with the
//! field's current value as default.
//!
//! # Errors
//!
//! All binders return the first [`BindError`] they meet. A bad command line
//! fails before any field is written. Otherwise fields written before the
//! failing one keep their new values; nothing is rolled back.

extern crate self as cfgbind;

pub mod error;

mod builder;
mod env;
pub mod file;
mod flags;
mod record;
mod tag;
mod unmarshal;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::Loader;
pub use cfgbind_macros::Bind;
pub use env::{Environment, ProcessEnv, bind_env};
pub use error::BindError;
pub use flags::{FlagSet, bind_flags};
pub use record::{Bind, Binding, Field, Slot, Source, Visitor, walk};
pub use tag::{Tag, parse_tag};
pub use unmarshal::{unmarshal, unmarshal_with_env};
pub use value::{Kind, Value, convert, parse_bool_token, parse_int_seq, strip_quotes};
