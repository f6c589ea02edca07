use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub smtp: SmtpSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Secret keying the anti-forgery tokens embedded in rendered forms.
    pub nonce_secret: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct StoreSettings {
    /// Address that receives a copy of every return/exchange notification.
    pub admin_email: String,
    /// Optional JSON fixture seeding the in-memory order/product store.
    #[serde(default)]
    pub fixture_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub enabled: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Check if we're already in returns-service directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("returns-service") {
        base_path.join("config")
    } else {
        base_path.join("returns-service").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
