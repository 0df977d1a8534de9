//! # cfgbind demo
//!
//! Loads a config file, then lets flags and environment variables override
//! it, and prints the result.
//!
//! ```sh
//! cargo run --example basic -- -intval 1234
//! INTVAL=12345 cargo run --example basic -- -intval 1234
//! cargo run --example basic -- -c demos/basic/config.toml -float 2.5
//! cargo run --example basic -- -help
//! RUST_LOG=cfgbind=debug cargo run --example basic -- -bool
//! ```

use std::process::ExitCode;

use cfgbind::{Bind, Loader};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Bind, Deserialize, Debug)]
#[serde(default)]
struct Config {
    #[bind(cmd = "c|path to config file")]
    config_file_path: String,

    #[bind(cmd = "intval|integer value", env = "INTVAL")]
    int_val: i32,

    #[bind(cmd = "int64|integer 64 value", env = "INT64")]
    int64: i64,

    #[bind(cmd = "strval", env = "STRVAL")]
    str_val: String,

    #[bind(cmd = "intslice|comma-separated integers", env = "INTSLICE")]
    int_slice: Vec<i32>,

    #[bind(nested)]
    data: Data,
}

#[derive(Bind, Deserialize, Debug, Default)]
#[serde(default)]
struct Data {
    #[bind(cmd = "float|how to use float", env = "FL64")]
    fl64: f64,

    #[bind(cmd = "bool|boolean value", env = "BOOL")]
    bool_val: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file_path: "config.toml".into(),
            // overridden by the file, a flag or INTVAL
            int_val: 123,
            int64: 0,
            str_val: String::new(),
            int_slice: Vec::new(),
            data: Data::default(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // First pass only to learn where the file lives; env is left out.
    let mut probe = Config::default();
    let mut loader = Loader::new("basic").args(args.clone()).no_env();
    if let Err(err) = loader.load_into(&mut probe) {
        return report(err);
    }

    let mut loader = Loader::new("basic").file(&probe.config_file_path).args(args);
    match loader.load::<Config>() {
        Ok(config) => {
            println!("{config:#?}");
            ExitCode::SUCCESS
        }
        Err(err) => report(err),
    }
}

fn report(err: cfgbind::BindError) -> ExitCode {
    match err {
        cfgbind::BindError::Flags(err) => {
            let _ = err.print();
            if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        err => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
