//! cropguru-cli — command-line client for the CropGuru REST API
//!
//! Every subcommand makes exactly one API call and prints the JSON response.
//!
//! # Subcommands
//! - `health`                           — server liveness
//! - `chat send <message> [--language]` — post a chat message
//! - `chat history`                     — last 50 messages
//! - `tasks list` / `tasks create <json>`
//! - `notifications`
//! - `predict <crop>` / `predictions`
//! - `irrigate <json>` / `alert <json>`
//! - `analyze-field`
//! - `forecast [--days N]`
//! - `location <value>`
//! - `disease analyze <file>` / `disease history`

use clap::{Parser, Subcommand};
use cropguru_cli::{ApiClient, DEFAULT_API_BASE};
use serde_json::Value;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "cropguru-cli",
    version,
    about = "CropGuru farming assistant — REST API client"
)]
struct Cli {
    /// API base URL (overrides CROPGURU_API_URL env var)
    #[arg(long, env = "CROPGURU_API_URL", default_value = DEFAULT_API_BASE)]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that the API is up
    Health,

    /// Assistant chat
    #[command(subcommand)]
    Chat(ChatCommand),

    /// Farm tasks
    #[command(subcommand)]
    Tasks(TasksCommand),

    /// List notifications
    Notifications,

    /// Request a yield prediction for a crop
    Predict {
        crop: String,
    },

    /// List yield prediction requests
    Predictions,

    /// Schedule irrigation with a JSON object, e.g. '{"crop":"Rice"}'
    Irrigate {
        data: String,
    },

    /// Set a weather alert with a JSON object
    Alert {
        data: String,
    },

    /// Start a satellite field analysis
    AnalyzeField,

    /// Rain forecast
    Forecast {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Set the farm location
    Location {
        location: String,
    },

    /// Crop disease detection
    #[command(subcommand)]
    Disease(DiseaseCommand),
}

#[derive(Debug, Subcommand)]
enum ChatCommand {
    /// Post a message
    Send {
        message: String,
        #[arg(long, default_value = "English")]
        language: String,
    },
    /// Show recent messages
    History,
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    /// List tasks
    List,
    /// Create a task from a JSON object
    Create { task: String },
}

#[derive(Debug, Subcommand)]
enum DiseaseCommand {
    /// Analyze an image; the file holds its base64 text
    Analyze { file: String },
    /// Show past analyses
    History,
}

// ============================================================================
// Main
// ============================================================================

fn parse_object(raw: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        anyhow::bail!("expected a JSON object, got: {}", raw);
    }
    Ok(value)
}

async fn run(client: &ApiClient, command: Commands) -> anyhow::Result<Value> {
    let value = match command {
        Commands::Health => client.health().await?,
        Commands::Chat(ChatCommand::Send { message, language }) => {
            client.post_chat_message(&message, &language).await?
        }
        Commands::Chat(ChatCommand::History) => client.fetch_chat_history().await?,
        Commands::Tasks(TasksCommand::List) => client.fetch_tasks().await?,
        Commands::Tasks(TasksCommand::Create { task }) => {
            client.create_task(&parse_object(&task)?).await?
        }
        Commands::Notifications => client.fetch_notifications().await?,
        Commands::Predict { crop } => client.get_yield_prediction(&crop).await?,
        Commands::Predictions => client.fetch_predictions().await?,
        Commands::Irrigate { data } => client.schedule_irrigation(&parse_object(&data)?).await?,
        Commands::Alert { data } => client.set_weather_alert(&parse_object(&data)?).await?,
        Commands::AnalyzeField => client.analyze_field().await?,
        Commands::Forecast { days } => client.forecast(days).await?,
        Commands::Location { location } => client.set_location(&location).await?,
        Commands::Disease(DiseaseCommand::Analyze { file }) => {
            let image = std::fs::read_to_string(&file)?;
            client.analyze_disease(image.trim()).await?
        }
        Commands::Disease(DiseaseCommand::History) => client.get_disease_history().await?,
    };
    Ok(value)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = async {
        let client = ApiClient::new(cli.api)?;
        let value = run(&client, cli.command).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        anyhow::Ok(())
    }
    .await;

    if let Err(e) = result {
        eprintln!("cropguru-cli: {}", e);
        std::process::exit(1);
    }
}
