use clap::{Parser, Subcommand};
use serde_json::Value;

use routing_gateway::geometry;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the routing gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Show routing engine readiness per profile
    Status,
    /// Decode an encoded polyline (prints [lon, lat] pairs)
    Decode {
        polyline: String,
        /// Keep the encoded (lat, lon) order instead of swapping
        #[arg(long)]
        lat_lon: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health => {
            let res = reqwest::get(format!("{}/health", cli.url)).await?;
            let status = res.status();
            println!("{} {}", status, res.text().await?);
        }
        Commands::Status => {
            let res = reqwest::get(format!("{}/ors_status", cli.url)).await?;
            print_response(res).await?;
        }
        Commands::Decode { polyline, lat_lon } => {
            let points: Vec<[f64; 2]> = if lat_lon {
                geometry::decode(&polyline)?
                    .into_iter()
                    .map(|(lat, lon)| [lat, lon])
                    .collect()
            } else {
                geometry::decode_lon_lat(&polyline)?
            };
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
