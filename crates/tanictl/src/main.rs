//! Tania Control - CLI client for the Tania catalog daemon.

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::TaniaClient;

#[derive(Parser)]
#[command(name = "tanictl")]
#[command(about = "Tania - agricultural catalog and mapping service", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base URL (default: http://127.0.0.1:7810, or $TANIAD_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health and table counts
    Health,

    /// List regencies of a province or districts of a regency
    Children {
        /// Province id (lists its regencies)
        #[arg(long)]
        province: Option<i64>,

        /// Regency id (lists its districts)
        #[arg(long)]
        regency: Option<i64>,
    },

    /// Filter commodity distribution facts
    Distributions {
        #[arg(long)]
        commodity: Option<i64>,
        #[arg(long)]
        province: Option<i64>,
        #[arg(long)]
        regency: Option<i64>,
        #[arg(long)]
        district: Option<i64>,
        /// Harvest year (default: current year)
        #[arg(long)]
        year: Option<i64>,
    },

    /// Search pests and diseases by symptoms
    Search {
        /// Free-text symptom description
        #[arg(long)]
        symptoms: Option<String>,

        /// Only pests affecting this commodity id
        #[arg(long)]
        commodity: Option<i64>,

        /// "pest" or "disease"
        #[arg(long = "type")]
        pest_type: Option<String>,
    },

    /// Ask the advisory chatbot
    Chat {
        /// Message to send
        message: String,
    },

    /// Show the most recently added pests
    Recent,

    /// Show one pest or disease in full
    Pest { id: i64 },

    /// Browse the commodity catalog
    Commodities {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show one commodity with varieties and distributions
    Commodity { id: i64 },

    /// Browse the variety catalog
    Varieties {
        #[arg(long)]
        commodity: Option<i64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show one variety
    Variety { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = TaniaClient::new(cli.url.as_deref());

    match cli.command {
        Commands::Health => commands::health(&client).await,
        Commands::Children { province, regency } => {
            commands::children(&client, province, regency).await
        }
        Commands::Distributions {
            commodity,
            province,
            regency,
            district,
            year,
        } => commands::distributions(&client, commodity, province, regency, district, year).await,
        Commands::Search {
            symptoms,
            commodity,
            pest_type,
        } => commands::search(&client, symptoms, commodity, pest_type).await,
        Commands::Chat { message } => commands::chat(&client, message).await,
        Commands::Recent => commands::recent(&client).await,
        Commands::Pest { id } => commands::pest(&client, id).await,
        Commands::Commodities {
            search,
            category,
            page,
        } => commands::commodities(&client, search, category, page).await,
        Commands::Commodity { id } => commands::commodity(&client, id).await,
        Commands::Varieties {
            commodity,
            search,
            page,
        } => commands::varieties(&client, commodity, search, page).await,
        Commands::Variety { id } => commands::variety(&client, id).await,
    }
}
