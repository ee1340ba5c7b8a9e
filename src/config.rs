//! Runtime configuration from the process environment.
//!
//! A `.env` file may be loaded first; variables already present in the
//! environment are never overwritten by it.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::client::{BASE_URL, DEFAULT_OS_TIMEZONE};

pub const DEFAULT_TOKEN_FILE: &str = "token.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Token from `COMFORT_TOKEN` or, failing that, the token file.
    pub token: Option<String>,
    /// Where a newly issued token is written.
    pub token_file: PathBuf,
    pub device: Option<String>,
    pub base_url: String,
    /// Offset sent with history queries, `±HH:MM`.
    pub os_timezone: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token_file = non_empty("COMFORT_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        // Prefer env var; fallback to the token file
        let token = match non_empty("COMFORT_TOKEN") {
            Some(t) => Some(t),
            None => read_token(&token_file),
        };

        let timeout_secs = match non_empty("COMFORT_TIMEOUT_SECS") {
            Some(s) => s
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| "COMFORT_TIMEOUT_SECS must be a positive integer".to_string())?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let os_timezone = non_empty("COMFORT_OS_TIMEZONE").unwrap_or_else(|| DEFAULT_OS_TIMEZONE.to_string());
        if !is_utc_offset(&os_timezone) {
            return Err(format!("COMFORT_OS_TIMEZONE must look like +01:00, got {}", os_timezone));
        }

        Ok(Config {
            username: non_empty("COMFORT_USERNAME"),
            password: lookup("COMFORT_PASSWORD").filter(|v| !v.is_empty()),
            token,
            token_file,
            device: non_empty("COMFORT_DEVICE"),
            base_url: non_empty("COMFORT_BASE_URL").unwrap_or_else(|| BASE_URL.to_string()),
            os_timezone,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Credentials needed to create a new session.
    pub fn credentials(&self) -> Result<(&str, &str), String> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err("missing credentials: set COMFORT_USERNAME and COMFORT_PASSWORD".to_string()),
        }
    }
}

fn read_token(path: &Path) -> Option<String> {
    let s = fs::read_to_string(path).ok()?;
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

pub fn store_token(path: &Path, token: &str) -> Result<(), String> {
    fs::write(path, format!("{}\n", token)).map_err(|e| format!("unable to write token to {}: {}", path.display(), e))
}

fn is_utc_offset(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 6
        && matches!(b[0], b'+' | b'-')
        && b[1].is_ascii_digit()
        && b[2].is_ascii_digit()
        && b[3] == b':'
        && b[4].is_ascii_digit()
        && b[5].is_ascii_digit()
}

/// Load `KEY=VALUE` lines from `path` into the process environment.
pub fn load_env_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    for (index, line) in contents.lines().enumerate() {
        let Some((key, value)) = parse_env_line(line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?
        else {
            continue;
        };
        if env::var_os(&key).is_none() {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn parse_env_line(line: &str) -> Result<Option<(String, String)>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
    let (key, raw) = line.split_once('=').ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(format!("invalid variable name: '{}'", key));
    }

    let raw = raw.trim();
    let value = match raw.chars().next() {
        Some('\'') => {
            let inner = &raw[1..];
            let end = inner.find('\'').ok_or_else(|| "unterminated quoted value".to_string())?;
            check_after_quote(&inner[end + 1..])?;
            inner[..end].to_string()
        }
        Some('"') => {
            // Backslash escapes apply only inside double quotes.
            let mut value = String::new();
            let mut chars = raw[1..].char_indices();
            let mut closed_at = None;
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => {
                        closed_at = Some(i + 1);
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, 'n')) => value.push('\n'),
                        Some((_, 'r')) => value.push('\r'),
                        Some((_, 't')) => value.push('\t'),
                        Some((_, other)) => value.push(other),
                        None => break,
                    },
                    _ => value.push(c),
                }
            }
            let end = closed_at.ok_or_else(|| "unterminated quoted value".to_string())?;
            check_after_quote(&raw[1 + end..])?;
            value
        }
        _ => raw.split('#').next().unwrap_or_default().trim_end().to_string(),
    };
    Ok(Some((key.to_string(), value)))
}

fn check_after_quote(rest: &str) -> Result<(), String> {
    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(())
    } else {
        Err("unexpected characters after closing quote".to_string())
    }
}
