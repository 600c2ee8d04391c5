//! Configuration Resolution Engine
//!
//! Resolution runs in two passes because the configuration-file path is
//! itself a flag:
//!
//! ```text
//! 1. Provisional scan      --config / --help only, everything else ignored
//!    ↓
//! 2. File load             section of this application, if any
//!    ↓
//! 3. Environment overlay   <APP>_<FLAG> over file value over struct default
//!    ↓
//! 4. Final parse           full flag set, command-line values win
//! ```
//!
//! Every call builds its own flag set, so concurrent resolutions never share
//! parser state.

use super::env::{EnvSource, ProcessEnv};
use super::error::{ConfigError, Result};
use super::file::{SectionBlock, decode_field, load_app_section};
use super::naming::env_var_name;
use super::overlay::overlay;
use super::schema::{Configurable, FieldValue, Schema};
use crate::app::AppName;
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::path::Path;

const CONFIG_FLAG: &str = "config";
const HELP_FLAG: &str = "help";
const OPERANDS: &str = "[operands]";

/// Resolve `config` for `app_name` from `args`, the process environment and
/// the configuration file named by `--config` / `<APP>_CONFIG_FILE`
///
/// `args` must not include the program name.
///
/// # Example
///
/// ```
/// use runkit::{Configurable, resolve_config};
///
/// #[derive(Default, Configurable)]
/// struct Config {
///     #[config(description = "Number of retries")]
///     max_retry_count: i64,
/// }
///
/// let mut config = Config::default();
/// resolve_config("fetcher", ["--max-retry-count=4"], &mut config).unwrap();
/// assert_eq!(config.max_retry_count, 4);
/// ```
pub fn resolve_config<T, I, S>(app_name: impl Into<AppName>, args: I, config: &mut T) -> Result<()>
where
    T: Configurable,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let app = app_name.into();
    ConfigResolver::new(&app).section(config).resolve(args)
}

/// Resolution run over one or more configuration structs
///
/// All sections share one flag set, one environment prefix and one section
/// of the configuration file.
pub struct ConfigResolver<'a> {
    app: AppName,
    env: Box<dyn EnvSource + 'a>,
    sections: Vec<Box<dyn Section + 'a>>,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(app: &AppName) -> Self {
        Self {
            app: app.clone(),
            env: Box::new(ProcessEnv),
            sections: Vec::new(),
        }
    }

    /// Read environment variables from `env` instead of the process
    pub fn with_env(mut self, env: impl EnvSource + 'a) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Add a configuration struct to resolve
    pub fn section<T: Configurable>(mut self, target: &'a mut T) -> Self {
        self.sections.push(Box::new(Bound {
            target,
            schema: Schema::of(),
        }));
        self
    }

    /// Run the resolution; sections are mutated in place
    ///
    /// # Errors
    ///
    /// Schema problems are reported before anything is read. A help request
    /// anywhere in `args` yields [`ConfigError::HelpRequested`] regardless of
    /// the validity of the other arguments.
    pub fn resolve<I, S>(mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        self.validate()?;

        let provisional = Provisional::scan(&args);
        let config_env = self.app.config_file_env();
        let config_file = provisional
            .config
            .or_else(|| self.env.var(&config_env))
            .filter(|path| !path.is_empty());

        if let Some(path) = &config_file {
            let path = Path::new(path);
            if let Some(block) = load_app_section(path, &self.app)? {
                for section in &mut self.sections {
                    section.apply_file(path, &block)?;
                }
            }
        }

        for section in &mut self.sections {
            section.apply_env(&self.app, self.env.as_ref())?;
        }

        let mut command = self.command(config_file.as_deref());

        if provisional.help {
            return Err(ConfigError::HelpRequested {
                help: command.render_help().to_string(),
            });
        }

        let matches = command
            .try_get_matches_from(&args)
            .map_err(|err| match err.kind() {
                ErrorKind::DisplayHelp => ConfigError::HelpRequested {
                    help: err.to_string(),
                },
                _ => ConfigError::FlagParse(err),
            })?;

        for section in &mut self.sections {
            section.apply_matches(&matches);
        }

        let operands = matches.get_many::<String>(OPERANDS).map_or(0, |values| values.count());
        tracing::debug!(app = %self.app, config_file = ?config_file, operands, "Configuration resolved");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            section.validate()?;
            for flag in section.flag_names() {
                if !seen.insert(flag.to_owned()) {
                    return Err(ConfigError::DuplicateFlag {
                        flag: flag.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    fn command(&mut self, config_file: Option<&str>) -> Command {
        let config_env = self.app.config_file_env();
        let mut config_arg = Arg::new(CONFIG_FLAG)
            .long(CONFIG_FLAG)
            .value_name("PATH")
            .action(ArgAction::Set)
            .help(format!("File to read configuration from (env: {config_env})"));
        if let Some(path) = config_file {
            config_arg = config_arg.default_value(path.to_owned());
        }

        let mut command = Command::new(self.app.as_str().to_owned())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(config_arg)
            .arg(
                Arg::new(HELP_FLAG)
                    .short('h')
                    .long(HELP_FLAG)
                    .action(ArgAction::Help)
                    .help("Print help"),
            )
            .arg(
                Arg::new(OPERANDS)
                    .value_name("ARGS")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .help("Operands, left to the application"),
            );

        for section in &mut self.sections {
            command = command.args(section.args(&self.app));
        }
        command
    }
}

/// Result of the provisional pass
#[derive(Debug, Default, PartialEq, Eq)]
struct Provisional {
    config: Option<String>,
    help: bool,
}

impl Provisional {
    /// Look for `--config` and `-h`/`--help` only; stops at `--`
    fn scan(args: &[String]) -> Self {
        let mut found = Self::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--" => break,
                "-h" | "--help" => found.help = true,
                "--config" => {
                    if let Some(value) = args.next() {
                        found.config = Some(value.clone());
                    }
                }
                other => {
                    if let Some(value) = other.strip_prefix("--config=") {
                        found.config = Some(value.to_owned());
                    }
                }
            }
        }
        found
    }
}

/// Type-erased view of one configuration struct inside a resolution run
trait Section {
    fn validate(&self) -> Result<()>;
    fn flag_names(&self) -> Vec<&str>;
    fn apply_file(&mut self, path: &Path, block: &SectionBlock) -> Result<()>;
    fn apply_env(&mut self, app: &AppName, env: &dyn EnvSource) -> Result<()>;
    fn args(&mut self, app: &AppName) -> Vec<Arg>;
    fn apply_matches(&mut self, matches: &ArgMatches);
}

struct Bound<'a, T> {
    target: &'a mut T,
    schema: Schema<T>,
}

impl<T: Configurable> Section for Bound<'_, T> {
    fn validate(&self) -> Result<()> {
        self.schema.validate()
    }

    fn flag_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.flag_name.as_str())
            .collect()
    }

    fn apply_file(&mut self, path: &Path, block: &SectionBlock) -> Result<()> {
        for field in self.schema.fields() {
            let kind = field.binding.kind();
            if let Some(value) = decode_field(path, block, &field.name, &field.flag_name, kind)? {
                field.binding.set(self.target, value);
            }
        }
        Ok(())
    }

    fn apply_env(&mut self, app: &AppName, env: &dyn EnvSource) -> Result<()> {
        for field in self.schema.fields() {
            let var = env_var_name(app, &field.flag_name);
            let inherited = field.binding.get(self.target);
            let value = overlay(&var, env.var(&var).as_deref(), inherited)?;
            field.binding.set(self.target, value);
        }
        Ok(())
    }

    fn args(&mut self, app: &AppName) -> Vec<Arg> {
        self.schema
            .fields()
            .iter()
            .map(|field| {
                let env = env_var_name(app, &field.flag_name);
                let arg = Arg::new(field.flag_name.clone())
                    .long(field.flag_name.clone())
                    .help(format!("{} (env: {env})", field.description));

                match field.binding.get(self.target) {
                    FieldValue::Bool(current) => arg
                        .num_args(0..=1)
                        .require_equals(true)
                        .default_missing_value("true")
                        .value_parser(BoolishValueParser::new())
                        .action(ArgAction::Set)
                        .default_value(current.to_string()),
                    FieldValue::Int(current) => arg
                        .value_name("INT")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true)
                        .action(ArgAction::Set)
                        .default_value(current.to_string()),
                    FieldValue::String(current) => {
                        let arg = arg.value_name("STRING").action(ArgAction::Set);
                        if current.is_empty() {
                            arg
                        } else {
                            arg.default_value(current)
                        }
                    }
                    FieldValue::StringList(current) => {
                        let arg = arg
                            .value_name("STRINGS")
                            .value_delimiter(',')
                            .action(ArgAction::Append);
                        if current.is_empty() {
                            arg
                        } else {
                            arg.default_values(current)
                        }
                    }
                }
            })
            .collect()
    }

    fn apply_matches(&mut self, matches: &ArgMatches) {
        for field in self.schema.fields() {
            let flag = field.flag_name.as_str();
            if matches.value_source(flag) != Some(ValueSource::CommandLine) {
                continue;
            }

            let current = field.binding.get(self.target);
            let value = match current {
                FieldValue::Bool(_) => matches.get_one::<bool>(flag).copied().map(FieldValue::Bool),
                FieldValue::Int(_) => matches.get_one::<i64>(flag).copied().map(FieldValue::Int),
                FieldValue::String(_) => matches.get_one::<String>(flag).cloned().map(FieldValue::String),
                FieldValue::StringList(_) => matches
                    .get_many::<String>(flag)
                    .map(|values| FieldValue::StringList(values.cloned().collect())),
            };

            if let Some(value) = value {
                field.binding.set(self.target, value);
            }
        }
    }
}
