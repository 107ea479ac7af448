//! Warehouse connection settings loaded via OrthoConfig.
//!
//! Values come from `WAREHOUSE_*` environment variables, after an optional
//! `.env` file in the working directory has been applied.

use std::ffi::OsString;
use std::fmt;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use shop_data::output::DEFAULT_OUTPUT_DIR;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::ConfigError;
use crate::schema::DEFAULT_DATABASE;

const ENV_PREFIX: &str = "WAREHOUSE_";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_ROLE: &str = "analytics_engineer";
const REDACTED: &str = "<redacted>";

/// Raw loader settings; every field is optional until validated by
/// [`WarehouseSettings::credentials`].
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WAREHOUSE")]
pub struct WarehouseSettings {
    /// Warehouse server host name.
    pub host: Option<String>,
    /// Warehouse server port.
    pub port: Option<u16>,
    /// Login user.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Database holding the raw schemas.
    pub database: Option<String>,
    /// Role assumed after login.
    pub role: Option<String>,
    /// Directory holding the generated CSV files.
    pub data_dir: Option<String>,
}

impl fmt::Debug for WarehouseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("database", &self.database)
            .field("role", &self.role)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl WarehouseSettings {
    /// Applies `.env` when present, then reads the environment.
    ///
    /// Command-line arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when `.env` is unreadable or the merged
    /// sources cannot be deserialized.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "applied .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => {
                warn!(error = %err, "failed to read .env file");
                return Err(ConfigError::Load {
                    message: err.to_string(),
                });
            }
        }

        Self::load_from_iter([OsString::from("load-to-warehouse")]).map_err(|err| {
            ConfigError::Load {
                message: err.to_string(),
            }
        })
    }

    /// Validates the connection settings, applying defaults.
    ///
    /// Blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariables`] naming every absent required
    /// variable at once.
    pub fn credentials(&self) -> Result<WarehouseCredentials, ConfigError> {
        let required = [
            ("HOST", present(self.host.as_deref())),
            ("USER", present(self.user.as_deref())),
            ("PASSWORD", present(self.password.as_deref())),
        ];
        let names: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(suffix, _)| format!("{ENV_PREFIX}{suffix}"))
            .collect();

        let [(_, Some(host)), (_, Some(user)), (_, Some(password))] = required else {
            return Err(ConfigError::MissingVariables { names });
        };

        Ok(WarehouseCredentials {
            host: host.to_owned(),
            port: self.port.unwrap_or(DEFAULT_PORT),
            user: user.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            database: present(self.database.as_deref())
                .unwrap_or(DEFAULT_DATABASE)
                .to_owned(),
            role: present(self.role.as_deref())
                .unwrap_or(DEFAULT_ROLE)
                .to_owned(),
        })
    }

    /// Returns the configured data directory, falling back to the
    /// generator's output directory.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(present(self.data_dir.as_deref()).unwrap_or(DEFAULT_OUTPUT_DIR))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Validated connection parameters.
///
/// The password is wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseCredentials {
    host: String,
    port: u16,
    user: String,
    password: Zeroizing<String>,
    database: String,
    role: String,
}

impl WarehouseCredentials {
    /// Server host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Login user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Login password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Target database.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Role assumed after login.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl fmt::Debug for WarehouseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("database", &self.database)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for warehouse configuration parsing.

    use super::*;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARIABLES: [&str; 7] = [
        "WAREHOUSE_HOST",
        "WAREHOUSE_PORT",
        "WAREHOUSE_USER",
        "WAREHOUSE_PASSWORD",
        "WAREHOUSE_DATABASE",
        "WAREHOUSE_ROLE",
        "WAREHOUSE_DATA_DIR",
    ];

    fn load_with(values: &[(&str, &str)]) -> WarehouseSettings {
        let _guard = lock_env(VARIABLES.map(|name| {
            let value = values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        WarehouseSettings::load_from_iter([OsString::from("load-to-warehouse")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_optional_values_are_missing() {
        let settings = load_with(&[
            ("WAREHOUSE_HOST", "db.internal"),
            ("WAREHOUSE_USER", "loader"),
            ("WAREHOUSE_PASSWORD", "s3cret"),
        ]);

        let credentials = settings.credentials().expect("credentials are complete");
        assert_eq!(credentials.host(), "db.internal");
        assert_eq!(credentials.port(), 5432);
        assert_eq!(credentials.database(), "ecommerce_raw");
        assert_eq!(credentials.role(), "analytics_engineer");
        assert_eq!(settings.data_dir(), Utf8PathBuf::from("data/raw"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("WAREHOUSE_HOST", "warehouse.example"),
            ("WAREHOUSE_PORT", "6543"),
            ("WAREHOUSE_USER", "loader"),
            ("WAREHOUSE_PASSWORD", "s3cret"),
            ("WAREHOUSE_DATABASE", "staging_raw"),
            ("WAREHOUSE_ROLE", "loader_role"),
            ("WAREHOUSE_DATA_DIR", "/srv/shop/raw"),
        ]);

        let credentials = settings.credentials().expect("credentials are complete");
        assert_eq!(credentials.port(), 6543);
        assert_eq!(credentials.database(), "staging_raw");
        assert_eq!(credentials.role(), "loader_role");
        assert_eq!(credentials.password(), "s3cret");
        assert_eq!(settings.data_dir(), Utf8PathBuf::from("/srv/shop/raw"));
    }

    #[rstest]
    fn every_missing_required_variable_is_reported() {
        let settings = load_with(&[("WAREHOUSE_USER", "  ")]);

        assert_eq!(
            settings.credentials(),
            Err(ConfigError::MissingVariables {
                names: vec![
                    "WAREHOUSE_HOST".to_owned(),
                    "WAREHOUSE_USER".to_owned(),
                    "WAREHOUSE_PASSWORD".to_owned(),
                ],
            })
        );
    }

    #[rstest]
    fn debug_output_never_contains_the_password() {
        let settings = load_with(&[
            ("WAREHOUSE_HOST", "db.internal"),
            ("WAREHOUSE_USER", "loader"),
            ("WAREHOUSE_PASSWORD", "hunter2"),
        ]);
        let credentials = settings.credentials().expect("credentials are complete");

        for rendered in [format!("{settings:?}"), format!("{credentials:?}")] {
            assert!(!rendered.contains("hunter2"), "{rendered}");
            assert!(rendered.contains(REDACTED), "{rendered}");
        }
    }
}
