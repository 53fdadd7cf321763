use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "flowctl")]
#[command(about = "Management CLI for the flow balancer", long_about = None)]
struct Cli {
    #[arg(short, long, env = "FLOWCTL_URL", default_value = "http://localhost:80")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a backend (or pipeline) for a flow
    Balance {
        /// Flow identifier; numeric values are sent as numbers
        flow_id: String,
    },
    /// Release one connection on a backend
    Release {
        /// Backend address as configured
        server: String,
    },
    /// Show per-backend load and latency
    Monitor,
    /// Check balancer liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Balance { flow_id } => {
            let flow_id = match flow_id.parse::<u64>() {
                Ok(n) => json!(n),
                Err(_) => json!(flow_id),
            };
            client
                .post(format!("{}/balance", base))
                .json(&json!({ "flow_id": flow_id }))
                .send()
                .await?
        }
        Commands::Release { server } => {
            client
                .post(format!("{}/release", base))
                .json(&json!({ "server": server }))
                .send()
                .await?
        }
        Commands::Monitor => client.get(format!("{}/monitor", base)).send().await?,
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;

    if !status.is_success() {
        eprintln!("Error: balancer returned status {}", status);
        if let Some(message) = json.get("error").and_then(Value::as_str) {
            eprintln!("Response: {}", message);
        }
        std::process::exit(1);
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
