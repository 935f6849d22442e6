//! Command shell for the movie catalog.
//!
//! Connects to the hosted backend configured through `APPWRITE_*`
//! environment variables (or an in-memory backend with `--demo`), restores
//! any existing session and then executes one command per input line.

use anyhow::{Context, Result};
use movie_catalog::{
    AppwriteClient, BackendAccess, CatalogConfig, CollectionIds, MemoryBackend, RemoteBackend,
    SessionManager,
};
use pico_args::Arguments;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use mc_client::{
    commands::{ClientCommand, parse_command},
    shell::Shell,
};

const HELP: &str = "\
Browse, save and track movies from the terminal

USAGE:
  mc_client [OPTIONS]

OPTIONS:
  --email EMAIL         Sign in with this email at start
  --password PASS       Password for --email
  --demo                Use an in-memory backend instead of APPWRITE_* settings

FLAGS:
  -h, --help            Print help information

Type 'help' at the prompt to list commands.
";

struct Args {
    email: Option<String>,
    password: Option<String>,
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        email: pargs.opt_value_from_str("--email").ok().flatten(),
        password: pargs.opt_value_from_str("--password").ok().flatten(),
        demo: pargs.contains("--demo"),
    };

    // Load .env before reading configuration
    let _ = dotenvy::dotenv();
    env_logger::builder().format_target(false).init();

    run(args).await
}

fn build_access(demo: bool) -> Result<BackendAccess> {
    if demo {
        log::info!("Using in-memory backend");
        let backend: Arc<dyn RemoteBackend> = Arc::new(MemoryBackend::new());
        return Ok(BackendAccess::new(backend, CollectionIds::default()));
    }

    let config = CatalogConfig::from_env().context("Failed to load backend configuration")?;
    config.validate().context("Invalid backend configuration")?;
    log::info!(
        "Using backend {} (project {})",
        config.endpoint,
        config.project_id
    );

    let backend: Arc<dyn RemoteBackend> = Arc::new(AppwriteClient::new(&config));
    Ok(BackendAccess::new(backend, config.collections.clone()))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

async fn run(args: Args) -> Result<()> {
    let access = build_access(args.demo)?;
    let mut shell = Shell::new(SessionManager::new(access));

    print_lines(&shell.start().await);

    if let (Some(email), Some(password)) = (args.email, args.password) {
        let lines = shell
            .execute(ClientCommand::SignIn { email, password })
            .await;
        print_lines(&lines);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(ClientCommand::Quit) => {
                print_lines(&shell.execute(ClientCommand::Quit).await);
                break;
            }
            Ok(command) => print_lines(&shell.execute(command).await),
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}
