use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Session/token settings.
///
/// Read once at startup and passed into `SessionService` as an immutable
/// value; nothing in this crate consults ambient process state.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// Symmetric signing secret for access tokens.
    pub secret: String,
    /// Fixed issuer string placed in (and required of) every access token.
    pub issuer: String,
    pub access_token_expiry: i64,  // seconds (3600 = 1 hour)
    pub refresh_token_expiry: i64, // seconds (5184000 = 60 days)
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_file_parses() {
        let settings = get_configuration().expect("Failed to read configuration");

        assert_eq!(settings.auth.issuer, "chirpy");
        assert_eq!(settings.auth.access_token_expiry, 3600);
        assert_eq!(settings.auth.refresh_token_expiry, 5_184_000);
        assert!(settings
            .database
            .connection_string()
            .starts_with("postgres://"));
        assert!(!settings
            .database
            .connection_string_without_db()
            .contains(&settings.database.database_name));
    }
}
