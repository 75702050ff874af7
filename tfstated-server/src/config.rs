use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Username/password pair for HTTP Basic authentication.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    /// Base directory for persistent data. State documents live in
    /// `<data_dir>/state`, lock records in `<data_dir>/lock`.
    /// Defaults to the current working directory.
    pub data_dir: PathBuf,
    pub port: u16,
    /// Basic-auth credentials; `None` disables authentication entirely.
    pub auth: Option<BasicCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = env::var("TFSTATED_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let auth = parse_credentials(
            env::var("TFSTATED_AUTH_USERNAME").ok(),
            env::var("TFSTATED_AUTH_PASSWORD").ok(),
        )?;

        Ok(Config {
            data_dir,
            port,
            auth,
        })
    }

    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.data_dir.join("lock")
    }
}

/// Parse the optional Basic-auth credential pair.
///
/// Empty or whitespace-only values are treated as unset, so an empty
/// password can never silently allow unauthenticated access. Setting exactly
/// one of the pair is a configuration mistake and fails startup rather than
/// guessing.
pub fn parse_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<Option<BasicCredentials>> {
    let username = username.filter(|s| !s.trim().is_empty());
    let password = password.filter(|s| !s.trim().is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(BasicCredentials { username, password })),
        (None, None) => Ok(None),
        _ => bail!("TFSTATED_AUTH_USERNAME and TFSTATED_AUTH_PASSWORD must be set together"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials_none() {
        assert_eq!(parse_credentials(None, None).expect("should parse"), None);
    }

    #[test]
    fn test_parse_credentials_empty_strings_are_unset() {
        assert_eq!(
            parse_credentials(Some("".to_string()), Some("".to_string())).expect("should parse"),
            None
        );
        assert_eq!(
            parse_credentials(Some("   ".to_string()), Some("\t\n".to_string()))
                .expect("should parse"),
            None
        );
    }

    #[test]
    fn test_parse_credentials_valid_pair() {
        assert_eq!(
            parse_credentials(Some("tf".to_string()), Some("hunter2".to_string()))
                .expect("should parse"),
            Some(BasicCredentials {
                username: "tf".to_string(),
                password: "hunter2".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_credentials_half_pair_is_an_error() {
        assert!(parse_credentials(Some("tf".to_string()), None).is_err());
        assert!(parse_credentials(None, Some("hunter2".to_string())).is_err());
        assert!(parse_credentials(Some("tf".to_string()), Some(" ".to_string())).is_err());
    }
}
