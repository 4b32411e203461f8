use std::{env, str::FromStr, time::Duration};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads and parses the environment variable `name`. Returns `None` if it is unset, or `Some(Err)` with a printable
/// reason if it is set but cannot be parsed.
pub fn parse_env<T>(name: &str) -> Option<Result<T, String>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = env::var(name).ok()?;
    Some(value.trim().parse::<T>().map_err(|e| format!("{value} is not a valid value for {name}. {e}")))
}

/// Reads a duration given in milliseconds from the environment variable `name`.
pub fn parse_env_millis(name: &str) -> Option<Result<Duration, String>> {
    parse_env::<u64>(name).map(|r| r.map(Duration::from_millis))
}
