#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::{Bind, BindError, Field, Slot, Visitor};

    #[derive(Bind, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    pub struct Record {
        #[bind(cmd = "intval|integer value", env = "INTVAL")]
        pub int_val: i32,

        #[bind(cmd = "int64|integer 64 value ", env = "INT64")]
        pub int64: i64,

        #[bind(cmd = "strval", env = "STRVAL")]
        pub str_val: String,

        #[bind(cmd = "intslice", env = "INTSLICE")]
        pub int_slice: Vec<i32>,

        #[bind(nested)]
        pub data: Data,

        #[bind(env = "NAME")]
        pub name: String,

        /// Not bound to any source.
        pub note: String,
    }

    #[derive(Bind, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    pub struct Data {
        #[bind(cmd = "float|how to use float", env = "FL64")]
        pub fl64: f64,

        #[bind(cmd = "bool|boolean value", env = "BOOL")]
        pub bool_val: bool,
    }

    /// A record with a field no converter supports.
    #[derive(Bind, Debug, Default)]
    pub struct Unsupported {
        #[bind(cmd = "name", env = "NAME")]
        pub name: String,

        #[bind(cmd = "port|listen port", env = "PORT")]
        pub port: u16,
    }

    /// Two fields claiming the same flag.
    #[derive(Bind, Debug, Default)]
    pub struct Clash {
        #[bind(cmd = "level")]
        pub level: i32,

        #[bind(cmd = "verbose, level|verbosity")]
        pub verbose: bool,
    }

    /// Claims the name clap gives its help flag.
    #[derive(Bind, Default, Debug)]
    pub struct HelpField {
        #[bind(cmd = "help|how much help")]
        pub help: i32,
    }

    /// Flag with an alias.
    #[derive(Bind, Debug, Default)]
    pub struct Aliased {
        #[bind(cmd = "config,c|path to config file", env = "CONFIG")]
        pub config: String,
    }

    /// Implements `Bind` by hand instead of deriving it.
    #[derive(Debug, Default)]
    pub struct Hand {
        pub level: i64,
        pub tags: Vec<i32>,
    }

    impl Bind for Hand {
        fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), BindError> {
            visitor.visit_field(Field {
                name: "level",
                cmd: "level|log level",
                env: "LEVEL",
                slot: Slot::from(&mut self.level),
            })?;
            visitor.visit_field(Field {
                name: "tags",
                cmd: "",
                env: "TAGS",
                slot: Slot::from(&mut self.tags),
            })
        }
    }

    #[test]
    fn derived_record_starts_from_defaults() {
        let record = Record::default();
        assert_eq!(record.int_val, 0);
        assert!(record.int_slice.is_empty());
        assert!(!record.data.bool_val);
    }
}
