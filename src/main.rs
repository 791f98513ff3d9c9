use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use contact_widget::{Config, ContactClient, Field, SubmissionPhase, Tab, WidgetController};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "contact-widget")]
#[command(about = "Help button with webchat and phone callback requests", version)]
struct Cli {
    /// Backend base URL (overrides config and CONTACT_WIDGET_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Anti-forgery token sent as X-CSRFToken
    #[arg(long, global = true)]
    csrf_token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a webchat message without opening the TUI
    Webchat {
        /// Message text
        message: String,
    },
    /// Request a phone callback without opening the TUI
    Phone {
        /// Phone number in +998XXXXXXXXX format
        number: String,
        /// Optional note for the operator
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Print the resolved configuration
    Config {
        /// Write it to the config file as well
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.apply_env();
    config.apply_overrides(cli.base_url, cli.csrf_token, cli.timeout);

    init_logging(&config)?;
    tracing::info!(base_url = %config.base_url, "starting contact-widget v{}", env!("CARGO_PKG_VERSION"));

    let client = ContactClient::from_config(&config)?;

    match cli.command {
        None => run_tui(client).await,
        Some(Commands::Webchat { message }) => {
            send_once(&client, Tab::Webchat, &[(Field::WebchatMessage, message.as_str())]).await
        }
        Some(Commands::Phone { number, note }) => {
            let note = note.unwrap_or_default();
            send_once(
                &client,
                Tab::Phone,
                &[(Field::PhoneNumber, number.as_str()), (Field::PhoneNote, note.as_str())],
            )
            .await
        }
        Some(Commands::Config { save }) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config.save()?;
                println!("Saved to {}", Config::config_path()?.display());
            }
            Ok(())
        }
    }
}

/// Logs go to a file: the TUI owns the terminal.
fn init_logging(config: &Config) -> Result<()> {
    let log_path = config.log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_tui(client: ContactClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let base_url = client.base_url().to_string();
    let mut app = App::new(Arc::new(client), &base_url, events.sender());

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

/// Drive one submission through a fresh widget and print the resulting alert.
async fn send_once(client: &ContactClient, tab: Tab, fields: &[(Field, &str)]) -> Result<()> {
    let mut widget = WidgetController::new();
    widget.open();
    widget.switch_tab(tab);
    for (field, value) in fields {
        widget.set_field(*field, value);
    }

    let reached = widget.submit_with(tab, client).await;
    let text = widget
        .alert()
        .map(|alert| alert.text.clone())
        .unwrap_or_default();

    if reached == Some(SubmissionPhase::Succeeded) {
        println!("{}", text);
        Ok(())
    } else {
        bail!("{}", text)
    }
}
