//! chainconnect CLI — query Ethereum JSON-RPC nodes from the terminal.
//!
//! Usage:
//! ```bash
//! # Validated call through the method registry
//! chainconnect call --url https://cloudflare-eth.com --method eth_getBalance \
//!     --params '["0x0000000000000000000000000000000000000000", "latest"]'
//!
//! # Connection snapshot (chain id, block height, accounts)
//! chainconnect status --url http://127.0.0.1:8545
//!
//! # List registered methods
//! chainconnect methods
//! ```
//!
//! `--url` falls back to `CHAINCONNECT_RPC_URL`. Log verbosity follows `RUST_LOG`.

use std::env;
use std::process;
use std::sync::Arc;

use chainconnect_core::{EthereumMethod, Provider, ProviderConnector, U256};
use chainconnect_http::http_connector;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const URL_ENV: &str = "CHAINCONNECT_RPC_URL";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "status" => cmd_status(&args[2..]).await,
        "methods" => {
            cmd_methods();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chainconnect {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainconnect {}", env!("CARGO_PKG_VERSION"));
    println!("Validated Ethereum JSON-RPC calls\n");
    println!("USAGE:");
    println!("    chainconnect <COMMAND>\n");
    println!("COMMANDS:");
    println!("    call       Send a JSON-RPC call (registered methods are validated)");
    println!("    status     Show chain id, block height and accounts");
    println!("    methods    List registered methods");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>       RPC endpoint URL  [default: ${URL_ENV}]");
    println!("    --method <NAME>   Method name       [call]");
    println!("    --params <JSON>   JSON array        [call, default: []]");
}

async fn cmd_call(args: &[String]) -> Result<(), String> {
    let url = resolve_url(args)?;
    let method = parse_flag(args, "--method").ok_or("--method is required")?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => parse_params(&raw)?,
        None => Vec::new(),
    };

    tracing::debug!(%url, %method, params = params.len(), "sending call");
    let connector = http_connector(url).map_err(|e| e.to_string())?;
    let result = connector
        .request(&method, params)
        .await
        .map_err(|e| e.to_string())?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result.to_value()).unwrap_or_default()
    );
    Ok(())
}

async fn cmd_status(args: &[String]) -> Result<(), String> {
    let url = resolve_url(args)?;
    let connector = http_connector(url.clone()).map_err(|e| e.to_string())?;
    let provider = Provider::create(Arc::new(connector)).await;
    tracing::debug!(%url, status = ?provider.status(), "snapshot taken");

    println!("Endpoint {url}");
    println!("  Status:       {:?}", provider.status());
    println!("  Chain id:     {}", show(provider.chain_id()));
    println!("  Block height: {}", show(provider.block_height()));
    println!("  Accounts:     {}", provider.connected_addresses().len());
    for address in provider.connected_addresses() {
        println!("    {address}");
    }
    Ok(())
}

fn cmd_methods() {
    println!("Registered methods:\n");
    for method in EthereumMethod::ALL {
        let arities: Vec<String> = method
            .spec()
            .params
            .shapes()
            .iter()
            .map(|shape| shape.len().to_string())
            .collect();
        println!("  {:<36} params: {}", method.as_str(), arities.join(" | "));
    }
}

fn show(value: Option<U256>) -> String {
    value.map_or_else(|| "unknown".to_string(), |n| n.to_string())
}

fn resolve_url(args: &[String]) -> Result<String, String> {
    parse_flag(args, "--url")
        .or_else(|| env::var(URL_ENV).ok())
        .ok_or_else(|| format!("--url is required (or set {URL_ENV})"))
}

fn parse_params(raw: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<Value>(raw).map_err(|e| format!("--params: {e}"))? {
        Value::Array(items) => Ok(items),
        _ => Err("--params must be a JSON array".into()),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
