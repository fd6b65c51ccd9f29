use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "reddit-proxy-cli")]
#[command(about = "Command-line client for the Reddit proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Session id returned by /auth/callback.
    #[arg(short, long, env = "REDDIT_PROXY_SESSION")]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy liveness
    Health,
    /// Fetch the top posts of all time for a subreddit
    Top {
        subreddit: String,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long)]
        after: Option<String>,
    },
    /// Print the Reddit authorization URL to visit
    LoginUrl,
    /// Show whether the session is authenticated
    Status,
    /// Forget the session on the proxy
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder().redirect(Policy::none()).build()?;

    let mut headers = HeaderMap::new();
    if let Some(session) = &cli.session {
        headers.insert("x-session-id", HeaderValue::from_str(session)?);
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Top { subreddit, limit, after } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(after) = after {
                query.push(("after", after));
            }
            let res = client
                .get(format!("{}/api/reddit/r/{}/top", cli.url, subreddit))
                .query(&query)
                .headers(headers)
                .send()
                .await?;
            if let Some(cache) = res.headers().get("x-cache").and_then(|v| v.to_str().ok()) {
                eprintln!("cache: {}", cache);
            }
            print_response(res).await?;
        }
        Commands::LoginUrl => {
            let res = client.get(format!("{}/auth/login", cli.url)).send().await?;
            match res.headers().get("location").and_then(|v| v.to_str().ok()) {
                Some(location) => println!("{}", location),
                None => print_response(res).await?,
            }
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/auth/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Logout => {
            let res = client
                .post(format!("{}/auth/logout", cli.url))
                .headers(headers)
                .send()
                .await?;
            println!("logout: {}", res.status());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
