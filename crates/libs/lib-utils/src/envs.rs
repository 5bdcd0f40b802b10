//! # Environment Variables
//!
//! Utilities for reading and parsing environment variables.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get an environment variable, falling back to `default` when it is unset.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable.
pub fn get_env_parse<T: FromStr>(name: &'static str) -> Result<T, Error> {
    let val = get_env(name)?;
    val.parse::<T>().map_err(|_| Error::WrongFormat(name))
}

/// Parse an environment variable, using `default` when it is unset.
///
/// A value that is present but malformed is still an error.
pub fn get_env_parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(val) => val.parse::<T>().map_err(|_| Error::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingEnv(name) => write!(fmt, "{name} must be set in environment"),
            Error::WrongFormat(name) => write!(fmt, "{name} has an invalid format"),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error
