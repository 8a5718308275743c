/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::error::Error;
use std::path::PathBuf;
use std::time;

use aws_s3_repository::types::{AuthenticationInfo, RepositoryLocation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_types::region::Region;
use clap::{CommandFactory, Parser, Subcommand};

type BoxError = Box<dyn Error + Send + Sync>;

const ONE_MEGABYTE: u64 = 1000 * 1000;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "s3repo")]
#[command(about = "Browses and transfers resources of a repository stored in an S3 bucket.")]
pub struct Args {
    /// Repository URL <s3://bucket/base/path>
    #[arg(long, short = 'r', required = true)]
    repository: String,

    /// Access key id, used together with `--password` before any other credential source
    #[arg(long)]
    username: Option<String>,

    /// Secret access key
    #[arg(long)]
    password: Option<String>,

    /// Profile consulted for credentials
    #[arg(long)]
    profile: Option<String>,

    /// Region the bucket is looked up in
    #[arg(long)]
    region: Option<String>,

    /// S3 compatible endpoint to use instead of Amazon S3
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Use path-style addressing
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    path_style: bool,

    /// HTTP proxy host to tunnel connections through
    #[arg(long, requires = "proxy_port")]
    proxy_host: Option<String>,

    /// HTTP proxy port
    #[arg(long, requires = "proxy_host")]
    proxy_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List the entries of a directory ("" for the repository root)
    Ls {
        #[arg(default_value = "")]
        directory: String,
    },
    /// Check whether a resource exists
    Exists { resource: String },
    /// Download a resource to a local file
    Get { resource: String, dest: PathBuf },
    /// Upload a local file as a resource
    Put { source: PathBuf, resource: String },
}

fn invalid_arg(message: &str) -> ! {
    Args::command()
        .error(clap::error::ErrorKind::InvalidValue, message)
        .exit()
}

fn report(verb: &str, bytes: usize, elapsed: time::Duration) {
    let megabytes = bytes as f64 / ONE_MEGABYTE as f64;
    let megabits = megabytes * 8f64;
    println!(
        "{verb} {bytes} bytes ({megabytes} MB) in {elapsed:?}; Mb/s: {}",
        megabits / elapsed.as_secs_f64(),
    );
}

async fn run(args: Args) -> Result<(), BoxError> {
    let location = RepositoryLocation::from_url(&args.repository)?;
    let auth = match (args.username, args.password) {
        (Some(username), Some(password)) => Some(AuthenticationInfo::new(username, password)),
        (None, None) => None,
        _ => invalid_arg("--username and --password must be given together"),
    };

    let mut config = aws_s3_repository::Config::builder().force_path_style(args.path_style);
    if let Some(profile) = args.profile {
        config = config.profile_name(profile);
    }
    if let Some(region) = args.region {
        config = config.region(Region::new(region));
    }
    if let Some(endpoint_url) = args.endpoint_url {
        config = config.endpoint_url(endpoint_url);
    }
    if let (Some(host), Some(port)) = (args.proxy_host, args.proxy_port) {
        config = config.proxy(host, port);
    }

    let repository = aws_s3_repository::Client::new(config.build());
    repository.connect(&location, auth.as_ref()).await?;

    match args.command {
        Command::Ls { directory } => {
            for entry in repository.list(&directory).await? {
                println!("{entry}");
            }
        }
        Command::Exists { resource } => {
            println!("{}", repository.exists(&resource).await?);
        }
        Command::Get { resource, dest } => {
            let mut transferred = 0;
            let start = time::Instant::now();
            repository
                .get(&resource, &dest, &mut |chunk: &[u8]| {
                    transferred += chunk.len();
                    tracing::trace!(transferred, "received chunk");
                })
                .await?;
            report("downloaded", transferred, start.elapsed());
        }
        Command::Put { source, resource } => {
            let mut transferred = 0;
            let start = time::Instant::now();
            repository
                .put(&source, &resource, &mut |chunk: &[u8]| {
                    transferred += chunk.len();
                    tracing::trace!(transferred, "sent chunk");
                })
                .await?;
            report("uploaded", transferred, start.elapsed());
        }
    }

    repository.disconnect();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    if let Err(ref err) = run(args).await {
        tracing::error!("repository operation failed: {}", DisplayErrorContext(err.as_ref()));
        std::process::exit(1);
    }

    Ok(())
}
