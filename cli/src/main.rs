use std::net::IpAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use rpc_transport::{Connection, HttpConfig, HttpConnection, TransportError, WsConfig, WsConnection};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid hex payload `{input}`: {source}")]
    InvalidHex { input: String, source: hex::FromHexError },
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("timed out waiting for reply")]
    Timeout,
}

#[derive(Parser, Debug)]
#[command(name = "rpc-transport-cli", about = "Send raw payloads over an RPC transport backend")]
struct Cli {
    #[arg(long, default_value_t = 15, help = "Seconds to wait for the reply")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange over the HTTP request/response backend.
    Http(HttpArgs),
    /// Exchange over the websocket backend with abridged framing.
    Ws(WsArgs),
}

#[derive(Args, Debug)]
struct HttpArgs {
    #[arg(long, env = "RPC_HTTP_SCHEME", default_value = "http")]
    scheme: String,

    #[arg(long, env = "RPC_HTTP_HOST", default_value = "localhost")]
    host: String,

    #[arg(long, env = "RPC_HTTP_PORT", default_value_t = 80)]
    port: u16,

    #[arg(long, env = "LOCAL_ADDRESS")]
    local_address: Option<IpAddr>,

    #[arg(help = "Hex payloads, written in order before the read")]
    payloads: Vec<String>,
}

#[derive(Args, Debug)]
struct WsArgs {
    #[arg(long, env = "RPC_WS_URL")]
    url: String,

    #[arg(help = "Hex payloads, each a multiple of 4 bytes")]
    payloads: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let (mut conn, payloads): (Box<dyn Connection>, Vec<String>) = match cli.command {
        Command::Http(args) => {
            let mut config = HttpConfig::new(args.host, args.port).with_scheme(args.scheme);
            config.local_address = args.local_address;
            (Box::new(HttpConnection::new(config)), args.payloads)
        }
        Command::Ws(args) => (Box::new(WsConnection::new(WsConfig::new(args.url))), args.payloads),
    };

    let payloads = decode_payloads(&payloads)?;
    let reply = exchange(conn.as_mut(), &payloads, Duration::from_secs(cli.timeout_secs)).await;
    conn.close().await?;

    let reply = reply?;
    tracing::info!(len = reply.len(), "reply received");
    println!("{}", hex::encode(reply));
    Ok(())
}

async fn exchange(
    conn: &mut dyn Connection,
    payloads: &[Vec<u8>],
    deadline: Duration,
) -> Result<Vec<u8>, CliError> {
    conn.connect().await?;
    for payload in payloads {
        conn.write(payload).await?;
    }

    tokio::time::timeout(deadline, conn.read())
        .await
        .map_err(|_| CliError::Timeout)?
        .map_err(CliError::from)
}

fn decode_payloads(inputs: &[String]) -> Result<Vec<Vec<u8>>, CliError> {
    inputs
        .iter()
        .map(|input| {
            hex::decode(input.trim()).map_err(|source| CliError::InvalidHex { input: input.clone(), source })
        })
        .collect()
}
