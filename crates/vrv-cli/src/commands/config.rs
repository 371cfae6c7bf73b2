use super::CommandContext;
use crate::ConfigCommands;
use anyhow::Result;
use std::path::Path;
use vrv_access::TokenMode;

pub fn handle_config_command(ctx: &CommandContext, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Init { path } => init_config(ctx, &path),
    }
}

fn show_config(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    println!("Current Configuration");
    println!("====================");

    println!("Data Directory: {}", config.data_dir.display());
    println!("Session File: {}", config.session_path().display());
    println!();

    println!("Session Settings:");
    println!("  Token Mode: {}", config.session.token_mode);
    if config.session.token_mode == TokenMode::Signed {
        println!("  JWT Secret: {}", if config.session.jwt_secret.is_some() { "<set>" } else { "<missing>" });
    }
    println!("  Token TTL: {}s", config.session.token_ttl_secs);
    println!();

    println!("Login Settings:");
    println!("  Latency: {}ms", config.login.latency_ms);
    println!();

    println!("Audit Settings:");
    println!("  Max Events: {}", config.audit.max_events);
    println!();

    let credential_count = config.credentials.as_ref().map(Vec::len);
    match credential_count {
        Some(count) => println!("Credentials: {} configured", count),
        None => println!("Credentials: built-in demo accounts"),
    }
    match &config.policy {
        Some(overrides) => println!("Policy Overrides: {}", overrides.keys().cloned().collect::<Vec<_>>().join(", ")),
        None => println!("Policy Overrides: none"),
    }

    Ok(())
}

fn init_config(ctx: &CommandContext, path: &Path) -> Result<()> {
    if path.exists() {
        return Err(anyhow::anyhow!("Refusing to overwrite existing file {}", path.display()));
    }

    ctx.config.save_to_file(path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}
