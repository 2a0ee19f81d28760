use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use relay_server::client::{ClientError, RelayClient};
use relay_server::relay::{HttpMethod, RelayBody, RelayRequest};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command line client for the relay server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay health
    Health,
    /// List configured upstream services
    Services,
    /// Relay a GET request
    Get { service: String, path: String },
    /// Relay an arbitrary request
    Send {
        service: String,
        path: String,
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: HttpMethod,
        /// Header as `name:value`, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// Query parameter as `name=value`, repeatable
        #[arg(short, long = "query", value_parser = parse_query)]
        query: Vec<(String, String)>,
        /// JSON body
        #[arg(long, conflicts_with = "data")]
        json: Option<String>,
        /// Raw body
        #[arg(short, long)]
        data: Option<String>,
        /// Upstream timeout in seconds
        #[arg(short, long, default_value_t = 10.0)]
        timeout: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = RelayClient::new(&cli.url);

    let result = match cli.command {
        Commands::Health => print_json(client.health().await),
        Commands::Services => print_json(client.services().await),
        Commands::Get { service, path } => print_json(client.relay_get(&service, &path).await),
        Commands::Send {
            service,
            path,
            method,
            headers,
            query,
            json,
            data,
            timeout,
        } => match build_request(service, path, method, headers, query, json, data, timeout) {
            Ok(request) => print_json(client.relay(&request).await),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    service: String,
    path: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    json: Option<String>,
    data: Option<String>,
    timeout: f64,
) -> Result<RelayRequest, String> {
    let body = match (json, data) {
        (Some(json), _) => {
            RelayBody::Json(serde_json::from_str(&json).map_err(|e| format!("invalid --json: {}", e))?)
        }
        (None, Some(data)) => RelayBody::Raw(data),
        (None, None) => RelayBody::None,
    };

    let mut request = RelayRequest::get(service, path)
        .with_method(method)
        .with_body(body)
        .with_timeout(timeout)
        .map_err(|e| e.to_string())?;
    if !headers.is_empty() {
        request.headers = Some(headers.into_iter().collect::<BTreeMap<_, _>>());
    }
    if !query.is_empty() {
        request.query_params = Some(query.into_iter().collect::<BTreeMap<_, _>>());
    }
    if !request.path.starts_with('/') {
        request.path = format!("/{}", request.path);
    }
    Ok(request)
}

fn print_json<T: Serialize>(result: Result<T, ClientError>) -> Result<(), String> {
    let value = result.map_err(|e| e.to_string())?;
    let pretty = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
    println!("{}", pretty);
    Ok(())
}

fn parse_method(raw: &str) -> Result<HttpMethod, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_uppercase()))
        .map_err(|_| format!("unsupported method '{}'", raw))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected name:value, got '{}'", raw))
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}
