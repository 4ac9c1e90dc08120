use clap::Parser;
use std::path::Path;

mod cli;
mod commands;
mod config;
mod domain;
mod services;

use cli::Cli;
use domain::errors::GateError;

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => {}
        Err(err) => {
            let code = err
                .downcast_ref::<GateError>()
                .map(GateError::code)
                .unwrap_or("INTERNAL");
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": {"code": code, "message": format!("{:#}", err)}
                    })
                );
            } else {
                eprintln!("abigate error: {:#}", err);
            }
            std::process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(Path::new(&cli.config))?;
    if commands::handle_release_commands(cli, &cfg)? {
        return Ok(());
    }
    commands::handle_admin_commands(cli, &cfg)?;
    Ok(())
}
