use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::app_state::{AppState, DashboardKind};
use crate::config_loader::AppConfig;
use crate::dashboard::{PriceDashboard, SatisfactionDashboard};
use crate::model::load_model;
use crate::price::PriceInput;

/// Top-level CLI interface for flightdash
#[derive(Parser)]
#[command(
    name = "flightdash",
    version,
    about = "Flight price and passenger satisfaction prediction dashboards"
)]
pub struct Cli {
    /// Configuration file (defaults to $FLIGHTDASH_CONFIG, then flightdash.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboards over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the expected feature columns of a model artifact
    Schema {
        /// Path to the JSON model manifest
        artifact: PathBuf,
    },

    /// Predict a flight price from JSON form values
    PredictPrice {
        /// Form values; omitted fields take the form defaults
        #[arg(short, long, default_value = "{}")]
        json: String,
    },

    /// Predict passenger satisfaction from JSON form values
    PredictSatisfaction {
        #[arg(short, long, default_value = "{}")]
        json: String,
    },

    /// Print the trend series of a dashboard's dataset
    Trends {
        #[arg(value_enum)]
        dashboard: DashboardKind,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn dispatch(command: Commands, mut config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = Arc::new(AppState::load(&config));
            let app = crate::web::build_router(state);

            let addr = config.server.bind_address();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!(%addr, "HTTP server listening");
            axum::serve(listener, app).await.context("Server error")?;
        }
        Commands::Schema { artifact } => {
            let model = load_model(&artifact)?;

            println!("model:   {}", model.model_id());
            println!("backend: {}", model.backend());
            println!("task:    {}", serde_json::to_string(&model.task())?);
            for (i, column) in model.expected_schema().iter().enumerate() {
                println!("{i:>4}  {column}");
            }
        }
        Commands::PredictPrice { json } => {
            let input: PriceInput =
                serde_json::from_str(&json).context("Invalid price form values")?;
            let dashboard = PriceDashboard::load(&config.price)?;
            print_json(&dashboard.predict(input)?)?;
        }
        Commands::PredictSatisfaction { json } => {
            let body: serde_json::Value =
                serde_json::from_str(&json).context("Invalid satisfaction form values")?;
            let dashboard = SatisfactionDashboard::load(&config.satisfaction)?;
            print_json(&dashboard.predict(body)?)?;
        }
        Commands::Trends { dashboard } => match dashboard {
            DashboardKind::Price => {
                print_json(PriceDashboard::load(&config.price)?.trends())?;
            }
            DashboardKind::Satisfaction => {
                print_json(SatisfactionDashboard::load(&config.satisfaction)?.trends())?;
            }
        },
    }

    Ok(())
}
