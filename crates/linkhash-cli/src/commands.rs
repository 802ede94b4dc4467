use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use linkhash_crypto::{KeyDerive, KeyDeriver};
use linkhash_server::{LinkServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Derive(args) => cmd_derive(args, &cli.format),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    println!(
        "{} linkhash on {} (links: {}/<key>)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.base_url.cyan()
    );
    let server = LinkServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Merge the config file (if any) with command-line overrides.
fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(key_length) = args.key_length {
        config.key_length = key_length;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_derive(args: DeriveArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let deriver = match args.key_length {
        Some(len) => KeyDeriver::new(len)?,
        None => KeyDeriver::default(),
    };
    for link in &args.links {
        match format {
            OutputFormat::Text => {
                println!("{}  {}", deriver.derive(link).to_string().yellow(), link)
            }
            OutputFormat::Json => println!("{}", derive_record(&deriver, link)),
        }
    }
    Ok(())
}

/// JSON description of a derived key, including the full digest it was cut from.
fn derive_record(deriver: &KeyDeriver, link: &str) -> serde_json::Value {
    json!({
        "key": deriver.derive(link),
        "digest": KeyDeriver::digest_hex(link),
        "link": link,
    })
}
