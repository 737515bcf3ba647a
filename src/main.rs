use ahu_eportal::{config::DEFAULT_CONFIG_FILE, AutoLogin, Config, PortalClient, PortalConfig};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ahu-eportal")]
#[command(about = "Automatic login tool for the AHU campus network eportal gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log into the campus network and notify configured webhooks
    ///
    /// Exits non-zero when the login fails, so a scheduled task can tell
    /// the attempts apart. The result message goes to stdout.
    Login,
    /// Show the local IP and whether the campus network is reachable
    Status,
    /// Interactively create the config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging
    // Diagnostics go to stderr; stdout carries only the result message
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Login => {
            let config = Config::load_or_default(&cli.config);
            let success = AutoLogin::new(config).run().await;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Status => {
            let config = Config::load_or_default(&cli.config);
            let ip = ahu_eportal::net::resolve_local_ip();
            let client =
                PortalClient::new(PortalConfig::default(), config.student_id, config.password, ip)?;
            println!("Local IP: {}", ip);
            if client.is_reachable().await {
                println!("Campus network: reachable");
            } else {
                println!("Campus network: unreachable");
            }
        }
        Commands::Init => {
            let config = prompt_config()?;
            config.save(&cli.config)?;
            println!("Created config: {}", cli.config.display());
        }
    }

    Ok(())
}

fn prompt_config() -> Result<Config, Box<dyn std::error::Error>> {
    let student_id = prompt_line("Student ID: ")?;
    let password = rpassword::prompt_password("Password: ")?;
    let webhook = prompt_line("Webhook URL (optional): ")?;

    let webhook_urls = if webhook.is_empty() {
        Vec::new()
    } else {
        vec![webhook]
    };

    Ok(Config {
        student_id,
        password,
        webhook_urls,
    })
}

fn prompt_line(prompt: &str) -> std::io::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
