use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration: set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a settings field to the environment variable that provides it.
/// The config crate reports bare field names for fields inside the tagged
/// provider enum and dotted paths everywhere else.
pub fn to_env_var(field: &str) -> String {
    let path = if field.contains('.') {
        field.to_string()
    } else {
        format!("provider.{}", field)
    };
    format!("PARLANCE_{}", path.replace('.', "__")).to_uppercase()
}
