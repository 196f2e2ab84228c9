use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub webdriver: WebDriverSettings,
}

#[derive(Deserialize, Clone)]
pub struct WebDriverSettings {
    pub url: String,
    pub headless: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
