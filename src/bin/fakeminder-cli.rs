use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "fakeminder-cli")]
#[command(about = "Inspect and reset a running FakeMinder gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8001")]
    url: String,

    #[arg(short, long, env = "FAKEMINDER_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List live sessions
    Sessions,
    /// End a session by id
    Revoke { id: String },
    /// Show failed-login counters and locks
    Lockouts,
    /// Clear failures and lock for a user
    Unlock { user: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let base = Url::parse(&cli.url)?;
    let request = match &cli.command {
        Commands::Status => client.get(endpoint(&base, &["status"])?),
        Commands::Sessions => client.get(endpoint(&base, &["sessions"])?),
        Commands::Revoke { id } => client.delete(endpoint(&base, &["sessions", id.as_str()])?),
        Commands::Lockouts => client.get(endpoint(&base, &["lockouts"])?),
        Commands::Unlock { user } => client.post(endpoint(&base, &["lockouts", user.as_str(), "reset"])?),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

/// `base` + `/admin/<segments>`, each segment percent-encoded.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("admin URL cannot be a base: {}", base))?
        .pop_if_empty()
        .push("admin")
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("ok");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
