use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, HOST};
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "authz-cli")]
#[command(about = "Management CLI for ext-authz-router", long_about = None)]
struct Cli {
    /// Selector / admin listener.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// ext_authz check listener.
    #[arg(long, default_value = "http://localhost:3001")]
    authz_url: String,

    #[arg(short, long, env = "ADMIN_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service status and snapshot generation
    Status,
    /// Reload the namespace document
    Reload,
    /// List namespaces with their targets
    Namespaces,
    /// Run a check as the proxy would and print the decision
    Check {
        /// Original request URL, e.g. https://app.int.kube/path
        target: String,
        /// Namespace sent as the x-namespace header
        #[arg(short, long)]
        namespace: Option<String>,
        /// Send `accept: text/html` like a browser
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder().redirect(Policy::none()).build()?;

    let mut admin_headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        admin_headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(admin_headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reload => {
            let res = client
                .post(format!("{}/admin/reload", cli.url))
                .headers(admin_headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Namespaces => {
            let res = client
                .get(format!("{}/admin/namespaces", cli.url))
                .headers(admin_headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check {
            target,
            namespace,
            html,
        } => {
            let original = Url::parse(&target)?;
            let mut path = original.path().to_string();
            if let Some(query) = original.query() {
                path.push('?');
                path.push_str(query);
            }

            let mut headers = HeaderMap::new();
            if let Some(host) = original.host_str() {
                let host = match original.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                headers.insert(HOST, HeaderValue::from_str(&host)?);
            }
            headers.insert("x-forwarded-proto", HeaderValue::from_str(original.scheme())?);
            if html {
                headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
            }
            if let Some(namespace) = namespace {
                headers.insert("x-namespace", HeaderValue::from_str(&namespace)?);
            }

            let res = client
                .get(format!("{}{}", cli.authz_url.trim_end_matches('/'), path))
                .headers(headers)
                .send()
                .await?;

            println!("{}", res.status());
            for (name, value) in res.headers() {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            let body = res.text().await?;
            if !body.is_empty() {
                println!("\n{body}");
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
