use std::env;
use std::fmt;

use quiz_core::model::{DashboardSettings, SettingsError, UserId};

const DEFAULT_USER: &str = "local";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidNumber { name: &'static str, raw: String },
    InvalidBool { name: &'static str, raw: String },
    Settings(SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid user id: {raw:?}"),
            ArgsError::InvalidNumber { name, raw } => write!(f, "invalid {name} value: {raw}"),
            ArgsError::InvalidBool { name, raw } => {
                write!(f, "invalid {name} value: {raw} (expected true/false)")
            }
            ArgsError::Settings(err) => write!(f, "invalid dashboard settings: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<SettingsError> for ArgsError {
    fn from(err: SettingsError) -> Self {
        ArgsError::Settings(err)
    }
}

/// Runtime configuration resolved from `.env` and the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub user_id: UserId,
    pub dashboard: DashboardSettings,
    pub rust_log: String,
}

impl Config {
    /// Read configuration from the environment. Call after `.env` is loaded.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArgsError> {
        let defaults = DashboardSettings::default();

        let user_id = match lookup("QUIZ_USER_ID") {
            Some(raw) => parse_user(raw)?,
            None => UserId::new(DEFAULT_USER),
        };
        let recent_window = lookup("QUIZ_RECENT_WINDOW")
            .map(|raw| parse_usize("QUIZ_RECENT_WINDOW", raw))
            .transpose()?
            .unwrap_or(defaults.recent_window());
        let subject_ranking = lookup("QUIZ_SUBJECT_RANKING")
            .map(|raw| parse_usize("QUIZ_SUBJECT_RANKING", raw))
            .transpose()?
            .unwrap_or(defaults.subject_ranking());
        let unknown_subject = lookup("QUIZ_UNKNOWN_SUBJECT")
            .unwrap_or_else(|| defaults.unknown_subject().to_owned());
        let include_unknown = lookup("QUIZ_INCLUDE_UNKNOWN")
            .map(|raw| parse_bool("QUIZ_INCLUDE_UNKNOWN", raw))
            .transpose()?
            .unwrap_or(defaults.include_unknown_subject());

        let dashboard = DashboardSettings::new(
            recent_window,
            subject_ranking,
            defaults.history_limit(),
            unknown_subject,
            include_unknown,
        )?;

        Ok(Self {
            user_id,
            dashboard,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned()),
        })
    }
}

pub fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidUser { raw })
}

fn parse_usize(name: &'static str, raw: String) -> Result<usize, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { name, raw })
}

fn parse_bool(name: &'static str, raw: String) -> Result<bool, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ArgsError::InvalidBool { name, raw }),
    }
}
