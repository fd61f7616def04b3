use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use route_normalizer::{normalize_origin, normalize_path};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the route normalizer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "ROUTE_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show catalog, tenant and cache state
    Status,
    /// Resolve a request URL against an application's catalog
    Resolve {
        app: String,
        url: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Match a path against a tenant's entry rules
    EntryRule {
        tenant_key: String,
        env_code: String,
        app: String,
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Match a path against a task's business activities
    Activity {
        task_id: String,
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Show the tenant binding of an application
    Tenant { app: String },
    /// Refresh catalog and tenant configs now
    Refresh,
    /// Empty the entry-rule and activity caches
    FlushCaches,
    /// Strip scheme, host and query from a URL (local, no server needed)
    Path { url: String },
    /// Keep only scheme and host of a URL (local, no server needed)
    Origin { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let request = match cli.command {
        Commands::Path { url } => {
            println!("{}", normalize_path(&url));
            return Ok(());
        }
        Commands::Origin { url } => {
            println!("{}", normalize_origin(&url));
            return Ok(());
        }
        Commands::Status => Request::get("/admin/status", vec![]),
        Commands::Resolve { app, url, method } => Request::get(
            "/admin/resolve",
            vec![("app", app), ("url", url), ("method", method)],
        ),
        Commands::EntryRule {
            tenant_key,
            env_code,
            app,
            path,
            method,
        } => Request::get(
            "/admin/entry-rule",
            vec![
                ("tenant_key", tenant_key),
                ("env_code", env_code),
                ("app", app),
                ("path", path),
                ("method", method),
            ],
        ),
        Commands::Activity {
            task_id,
            path,
            method,
        } => Request::get(
            "/admin/activity",
            vec![("task_id", task_id), ("path", path), ("method", method)],
        ),
        Commands::Tenant { app } => Request::get("/admin/tenant", vec![("app", app)]),
        Commands::Refresh => Request::post("/admin/refresh"),
        Commands::FlushCaches => Request::post("/admin/caches/flush"),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let client = reqwest::Client::new();
    let url = format!("{}{}", cli.url.trim_end_matches('/'), request.path);
    let builder = if request.post {
        client.post(url)
    } else {
        client.get(url)
    };
    let res = builder
        .headers(headers)
        .query(&request.query)
        .send()
        .await?;
    print_response(res).await
}

struct Request {
    post: bool,
    path: &'static str,
    query: Vec<(&'static str, String)>,
}

impl Request {
    fn get(path: &'static str, query: Vec<(&'static str, String)>) -> Self {
        Self {
            post: false,
            path,
            query,
        }
    }

    fn post(path: &'static str) -> Self {
        Self {
            post: true,
            path,
            query: vec![],
        }
    }
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
