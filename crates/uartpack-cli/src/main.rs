//! uartpack command-line inspector
//!
//! Decodes hex dumps captured from the serial link and encodes read requests.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uartpack_protocol::{
    classify, decode_response, encode_request, from_hex, to_hex, value, CodecError, KeyScheme,
    ReadRequest,
};

/// uartpack
#[derive(Parser, Debug)]
#[command(name = "uartpack")]
#[command(about = "Inspect MessagePack payloads exchanged with UART devices")]
#[command(version)]
struct Args {
    /// Wire key scheme (legacy or current)
    #[arg(short, long, default_value = "legacy")]
    scheme: KeyScheme,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify and decode a response, printing JSON
    Decode {
        /// Hex dump; multiple arguments are concatenated
        #[arg(required = true)]
        hex: Vec<String>,
    },
    /// Print the kind of a response
    Classify {
        /// Hex dump; multiple arguments are concatenated
        #[arg(required = true)]
        hex: Vec<String>,
    },
    /// Print every top-level value in a payload
    Dump {
        /// Hex dump; multiple arguments are concatenated
        #[arg(required = true)]
        hex: Vec<String>,
    },
    /// Encode a register read request
    Read {
        /// Request id
        rid: i32,
        /// Registers to read
        #[arg(required = true)]
        registers: Vec<i64>,
    },
}

fn payload(hex: &[String]) -> Result<Vec<u8>, CodecError> {
    let bytes = from_hex(&hex.join(""))?;
    tracing::debug!("parsed {} payload bytes", bytes.len());
    Ok(bytes)
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}

fn run(args: Args) -> Result<(), CodecError> {
    let scheme = args.scheme;
    match args.command {
        Command::Decode { hex } => {
            let response = decode_response(&payload(&hex)?, scheme)?;
            if response.is_empty() {
                tracing::warn!("payload matches no known response under the {} scheme", scheme);
            }
            println!("{}", to_json(&response));
        }
        Command::Classify { hex } => {
            println!("{}", classify(&payload(&hex)?, scheme)?);
        }
        Command::Dump { hex } => {
            for value in value::decode_all(&payload(&hex)?)? {
                println!("{}", value);
            }
        }
        Command::Read { rid, registers } => {
            let request = ReadRequest::new(rid, registers).into();
            println!("{}", to_hex(&encode_request(&request, scheme)?));
        }
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("using {} key scheme", args.scheme);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
