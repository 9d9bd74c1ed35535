use std::fs;

use anyhow::Context;
use chrono::Duration;
use tally_auth::{generate_password, hash_password, TokenSigner};
use tally_ledger::{LedgerWriter, NewAccount};
use tally_server::{ServerConfig, TallyServer};
use tally_types::{Role, UserId};

use crate::cli::{Cli, Command, ServeArgs, TokenArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Token(args) => cmd_token(args),
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&text).with_context(|| format!("parsing config file {path}"))?
        }
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let server = TallyServer::new(config)?;

    if args.demo {
        let seeded = seed_demo_accounts(server.state().ledger.as_ref())?;
        println!("Demo accounts (credentials are printed once):");
        for (role, username, password) in &seeded {
            println!("  {role:<10}  {username:<10}  {password}");
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_token(args: TokenArgs) -> anyhow::Result<()> {
    let signer = TokenSigner::from_seed_hex(&args.seed)?;
    let user: UserId = args.user.parse()?;
    let role: Role = args.role.parse()?;
    let token = signer.issue(user, role, Duration::seconds(args.ttl_secs))?;
    println!("{token}");
    Ok(())
}

/// One account per role, each with a freshly generated password.
fn seed_demo_accounts(
    ledger: &dyn LedgerWriter,
) -> anyhow::Result<Vec<(Role, String, String)>> {
    let mut seeded = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let username = role.as_str().to_lowercase();
        let password = generate_password();
        ledger.create_account(NewAccount {
            full_name: format!("Demo {role}"),
            email: format!("{username}@tally.local"),
            username: username.clone(),
            role,
            password_hash: hash_password(&password),
        })?;
        seeded.push((role, username, password));
    }
    Ok(seeded)
}
