//! Command-line access to the Kraken API
//!
//! Reads client settings from `TWITCH_*` environment variables (or a JSON file
//! named by `TWITCH_SETTINGS`), issues one call and prints the JSON result.
//!
//! ```text
//! kraken [METHOD] <endpoint> [key=value ...]
//! kraken auth-url [scope ...]
//! kraken token <code>
//! kraken refresh <refresh_token>
//! ```

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use twitch_kraken::{
    AuthUrlOptions, CallOptions, ClientSettings, TokenRequest, TracingLog, TwitchClient,
};

const METHODS: &[&str] = &["GET", "PUT", "POST", "DELETE", "PATCH"];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("usage: kraken [METHOD] <endpoint> [key=value ...] | auth-url | token | refresh");
    };

    let settings = match std::env::var("TWITCH_SETTINGS") {
        Ok(path) => ClientSettings::from_file(path)?,
        Err(_) => ClientSettings::from_env()?,
    };
    let client = TwitchClient::new(settings.into_config().log(TracingLog))?;

    let output = match command.as_str() {
        "auth-url" => {
            let url = client.auth_url(&AuthUrlOptions::new().scope(&args[1..]))?;
            println!("{url}");
            return Ok(());
        }
        "token" => {
            let code = args.get(1).context("missing authorization code")?;
            serde_json::to_value(client.exchange_token(&TokenRequest::code(code)).await?)?
        }
        "refresh" => {
            let refresh_token = args.get(1).context("missing refresh token")?;
            serde_json::to_value(
                client
                    .exchange_token(&TokenRequest::refresh(refresh_token))
                    .await?,
            )?
        }
        _ => {
            let (method, rest) = if METHODS.contains(&command.to_uppercase().as_str()) {
                (command.to_uppercase(), &args[1..])
            } else {
                ("GET".to_string(), &args[..])
            };
            let (endpoint, pairs) = rest.split_first().context("missing endpoint")?;

            let mut options = CallOptions::new();
            for pair in pairs {
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("expected key=value, got {pair}"))?;
                options = options.param(key, value);
            }

            client.call(&method, endpoint, options).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
