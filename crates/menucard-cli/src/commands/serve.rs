//! Serve command - start the HTTP server.

use anyhow::Result;

use menucard_core::Config;
use menucard_gateway::{Gateway, GatewayConfig};

use crate::ui;

/// Serve command arguments.
#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port override.
    pub port: Option<u16>,
    /// Bind address override.
    pub bind: Option<String>,
}

/// Run the serve command.
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = match Config::load_default() {
        Ok(c) => c,
        Err(e) => {
            ui::warning(&format!("Config unusable ({e}), using defaults"));
            Config::default().with_env_overrides()
        }
    };

    let mut gateway_config = GatewayConfig::from_config(&config);
    if let Some(port) = args.port {
        gateway_config.port = port;
    }
    if let Some(bind) = args.bind {
        gateway_config.bind_address = bind;
    }

    ui::header("Starting Menucard");
    ui::kv(
        "Address",
        &format!("{}:{}", gateway_config.bind_address, gateway_config.port),
    );
    ui::kv("Data dir", &gateway_config.data_dir.display().to_string());
    ui::kv(
        "Uploads",
        &gateway_config.upload_dir.display().to_string(),
    );

    let gateway = Gateway::new(gateway_config)?;
    gateway.run().await?;

    Ok(())
}
