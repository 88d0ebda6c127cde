use colored::Colorize;
use depot_client::{checkin, checkout, Session, StoreClient};
use depot_server::{Server, ServerConfig};
use depot_types::ObjectHash;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Checkin(args) => cmd_checkin(args).await,
        Command::Checkout(args) => cmd_checkout(args).await,
        Command::Resolve(args) => cmd_resolve(args).await,
        Command::Exists(args) => cmd_exists(args).await,
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        bind_addr: args.bind,
        root: args.root,
        ..ServerConfig::default()
    };
    let server = Server::bind(config).await?;
    println!(
        "depot server on {} (root: {})",
        server.local_addr()?.to_string().bold(),
        server.config().root.display()
    );
    server.run().await?;
    Ok(())
}

async fn cmd_checkin(args: CheckinArgs) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("{} is not a directory", args.dir.display());
    }
    let session = Session::new(args.server);
    let manifest_hash = checkin(&session, &args.dir, &args.label).await?;
    println!(
        "{} Checked in {} as {}",
        "✓".green().bold(),
        args.dir.display().to_string().bold(),
        args.label.yellow()
    );
    println!("  Manifest: {}", manifest_hash.to_hex().cyan());
    Ok(())
}

async fn cmd_checkout(args: CheckoutArgs) -> anyhow::Result<()> {
    let session = Session::new(args.server);
    checkout(&session, &args.dir, &args.label).await?;
    println!(
        "{} Checked out {} into {}",
        "✓".green().bold(),
        args.label.yellow(),
        args.dir.display().to_string().bold()
    );
    Ok(())
}

async fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let session = Session::new(args.server);
    let mut client = StoreClient::connect(&session).await?;
    let hash = client.get_label(&args.label).await?;
    println!("{}", hash.to_hex());
    Ok(())
}

async fn cmd_exists(args: ExistsArgs) -> anyhow::Result<()> {
    let hash = ObjectHash::from_hex(&args.hash)?;
    let session = Session::new(args.server);
    let mut client = StoreClient::connect(&session).await?;
    if client.exists(&hash).await? {
        println!("{} {}", "present".green(), hash.short_hex().dimmed());
        Ok(())
    } else {
        println!("{} {}", "absent".red(), hash.short_hex().dimmed());
        std::process::exit(1);
    }
}
