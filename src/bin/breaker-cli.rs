use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "breaker-cli")]
#[command(about = "Inspect a running album gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Status,
    /// List circuit breakers, or show one by name
    Breakers {
        name: Option<String>,
    },
    /// Fetch the album list exactly as clients see it
    Albums,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/health")).send().await?;
            print_json(res).await?;
        }
        Commands::Breakers { name: None } => {
            let res = client.get(format!("{base}/admin/breakers")).send().await?;
            print_json(res).await?;
        }
        Commands::Breakers { name: Some(name) } => {
            let res = client
                .get(format!("{base}/admin/breakers/{name}"))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Albums => {
            let res = client.get(format!("{base}/albums")).send().await?;
            println!("{}", res.text().await?);
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
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
