use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::env::{ProcessEnv, bind_env};
use crate::error::BindError;
use crate::file;
use crate::flags::{FlagSet, bind_flags};
use crate::record::Bind;

/// Builder that runs every layer in order: defaults, file, command line,
/// environment.
///
/// ```ignore
/// let config: AppConfig = Loader::new("myapp")
///     .file("myapp.toml")
///     .env_prefix("MYAPP_")
///     .load()?;
/// ```
///
/// Without [`args()`](Self::args) the process arguments are used (minus the
/// program name); without [`env_vars()`](Self::env_vars) the process
/// environment is used.
#[derive(Debug, Clone)]
pub struct Loader {
    flags: FlagSet,
    file: Option<PathBuf>,
    require_file: bool,
    env_prefix: String,
    env_enabled: bool,
    args: Option<Vec<String>>,
    env_vars: Option<Vec<(String, String)>>,
}

impl Loader {
    /// `app_name` names the command in help output.
    pub fn new(app_name: &str) -> Self {
        Self::with_flags(FlagSet::new(app_name))
    }

    /// Start from an existing flag set, e.g. one built around a custom clap command.
    pub fn with_flags(flags: FlagSet) -> Self {
        Self {
            flags,
            file: None,
            require_file: false,
            env_prefix: String::new(),
            env_enabled: true,
            args: None,
            env_vars: None,
        }
    }

    /// Read defaults from this file. A missing file is skipped unless
    /// [`require_file(true)`](Self::require_file) is set.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Fail when the file set with [`file()`](Self::file) does not exist.
    pub fn require_file(mut self, required: bool) -> Self {
        self.require_file = required;
        self
    }

    /// Prefix prepended to every environment binding (default: empty).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Skip the environment layer entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Command-line arguments to parse, without the program name.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Use these entries instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// The flag set, e.g. to render help after a failed load.
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Build a record from the file (or `T::default()`), then apply the
    /// command line and the environment.
    pub fn load<T>(&mut self) -> Result<T, BindError>
    where
        T: Bind + DeserializeOwned + Default,
    {
        let mut record = match &self.file {
            Some(path) if self.require_file => file::load_file(path)?,
            Some(path) => match file::load_optional_file(path)? {
                Some(record) => record,
                None => {
                    debug!(path = %path.display(), "config file not found, using defaults");
                    T::default()
                }
            },
            None => T::default(),
        };
        self.bind(&mut record)?;
        Ok(record)
    }

    /// Apply the command line and the environment onto a caller-built record.
    /// The file set with [`file()`](Self::file) is not read.
    pub fn load_into<T>(&mut self, record: &mut T) -> Result<(), BindError>
    where
        T: Bind + ?Sized,
    {
        self.bind(record)
    }

    fn bind<T: Bind + ?Sized>(&mut self, record: &mut T) -> Result<(), BindError> {
        match &self.args {
            Some(args) => bind_flags(record, &mut self.flags, args.iter().cloned())?,
            None => bind_flags(record, &mut self.flags, std::env::args().skip(1))?,
        }

        if !self.env_enabled {
            return Ok(());
        }
        match &self.env_vars {
            Some(vars) => bind_env(record, &self.env_prefix, vars),
            None => bind_env(record, &self.env_prefix, &ProcessEnv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::Record;
    use std::fs;
    use tempfile::TempDir;

    fn loader() -> Loader {
        Loader::new("test")
            .args(Vec::<String>::new())
            .env_vars(Vec::<(String, String)>::new())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let record: Record = loader().load().unwrap();
        assert_eq!(record, Record::default());
    }

    #[test]
    fn file_then_flags_then_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "int_val = 10\nint64 = 20\nstr_val = \"file\"\n").unwrap();

        let record: Record = loader()
            .file(&path)
            .env_prefix("P_")
            .args(["-intval", "11", "-int64", "21"])
            .env_vars([("P_INTVAL", "12")])
            .load()
            .unwrap();

        assert_eq!(record.int_val, 12);
        assert_eq!(record.int64, 21);
        assert_eq!(record.str_val, "file");
    }

    #[test]
    fn missing_optional_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let record: Record = loader()
            .file(dir.path().join("absent.toml"))
            .args(["-intval", "3"])
            .load()
            .unwrap();
        assert_eq!(record.int_val, 3);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = loader()
            .file(dir.path().join("absent.toml"))
            .require_file(true)
            .load::<Record>();
        assert!(matches!(result, Err(BindError::IoError { .. })));
    }

    #[test]
    fn no_env_skips_environment() {
        let record: Record = loader()
            .env_vars([("INTVAL", "5")])
            .no_env()
            .load()
            .unwrap();
        assert_eq!(record.int_val, 0);
    }

    #[test]
    fn load_into_keeps_caller_defaults() {
        let mut record = Record {
            int_val: 123,
            str_val: "default".into(),
            ..Record::default()
        };
        loader()
            .env_vars([("STRVAL", "Env")])
            .load_into(&mut record)
            .unwrap();
        assert_eq!(record.int_val, 123);
        assert_eq!(record.str_val, "env");
    }

    #[test]
    fn help_available_after_load() {
        let mut loader = loader();
        let _: Record = loader.load().unwrap();
        assert!(loader.flags_mut().render_help().contains("--intslice"));
    }
}
