use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const DEFAULT_SERVER: &str = "127.0.0.1:7420";

#[derive(Parser)]
#[command(
    name = "depot",
    about = "depot — content-addressable versioning store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the store server
    Serve(ServeArgs),
    /// Publish a directory tree under a label
    Checkin(CheckinArgs),
    /// Materialize a labeled tree into a directory
    Checkout(CheckoutArgs),
    /// Print the manifest hash a label is bound to
    Resolve(ResolveArgs),
    /// Check whether the store holds an object
    Exists(ExistsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_SERVER)]
    pub bind: SocketAddr,
    /// Depot root directory (holds objects/ and labels/)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Args)]
pub struct CheckinArgs {
    /// Directory tree to publish
    pub dir: PathBuf,
    /// Label to bind the snapshot to
    pub label: String,
    /// Store server address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: SocketAddr,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Destination directory (created if missing)
    pub dir: PathBuf,
    /// Label to materialize
    pub label: String,
    /// Store server address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: SocketAddr,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Label to resolve
    pub label: String,
    /// Store server address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: SocketAddr,
}

#[derive(Args)]
pub struct ExistsArgs {
    /// Hex-encoded object hash
    pub hash: String,
    /// Store server address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: SocketAddr,
}
