use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use figment_file_provider_adapter::FileAdapter;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::signal;
use tracing_subscriber::{prelude::*, util::SubscriberInitExt, EnvFilter};

pub const ENV_PREFIX: &str = "CONTRIBUTOR_SENTINEL_";

/// Sets up logging, then loads `C` from `defaults`, the optional config file passed as the first
/// command line argument, and `CONTRIBUTOR_SENTINEL_*` environment variables.
pub fn init<C>(defaults: &str) -> anyhow::Result<C>
where
    C: DeserializeOwned,
{
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive("contributor_sentinel_server=DEBUG".parse()?)
                .from_env()?,
        )
        .init();

    let path = std::env::args().nth(1);
    load_config(defaults, path.as_deref().map(Path::new))
}

pub fn load_config<C>(defaults: &str, path: Option<&Path>) -> anyhow::Result<C>
where
    C: DeserializeOwned,
{
    let mut figment = Figment::from(Toml::string(defaults));

    if let Some(path) = path {
        tracing::info!("Loading config from file {}", path.display());
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => anyhow::bail!("Unknown config format: {path:?}"),
        };
    }

    // `*_FILE` variables are replaced by the contents of the file they point at
    Ok(figment
        .merge(FileAdapter::wrap(Env::prefixed(ENV_PREFIX)))
        .extract::<C>()?)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sample {
        main_branch: String,
        token: String,
        port: u16,
    }

    const DEFAULTS: &str = r#"
        main_branch = "main"
        token = "unset"
        port = 8080
    "#;

    #[test]
    fn defaults_only() {
        Jail::expect_with(|_jail| {
            let config: Sample = load_config(DEFAULTS, None).unwrap();
            assert_eq!(
                config,
                Sample {
                    main_branch: "main".into(),
                    token: "unset".into(),
                    port: 8080,
                }
            );
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file("sentinel.toml", r#"main_branch = "trunk""#)?;
            jail.set_env("CONTRIBUTOR_SENTINEL_PORT", "9000");

            let config: Sample = load_config(DEFAULTS, Some(Path::new("sentinel.toml"))).unwrap();
            assert_eq!(config.main_branch, "trunk");
            assert_eq!(config.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn env_file_indirection() {
        Jail::expect_with(|jail| {
            jail.create_file("token", "s3cr3t")?;
            jail.set_env("CONTRIBUTOR_SENTINEL_TOKEN_FILE", "token");

            let config: Sample = load_config(DEFAULTS, None).unwrap();
            assert_eq!(config.token, "s3cr3t");
            Ok(())
        });
    }

    #[test]
    fn unknown_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("sentinel.yaml", "port: 1")?;
            let err = load_config::<Sample>(DEFAULTS, Some(Path::new("sentinel.yaml")))
                .unwrap_err()
                .to_string();
            assert!(err.contains("Unknown config format"), "{err}");
            Ok(())
        });
    }
}
