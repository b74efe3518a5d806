use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use secure_echo::config::ChannelConfig;
use secure_echo::error::{ChannelError, Result};
use secure_echo::service::client::SecureClient;
use secure_echo::service::server;
use secure_echo::utils::logging::init_logging;

const USAGE: &str = "usage: secure-echo -l [port] | secure-echo [port] <message>";

/// Encrypted one-shot echo over TCP.
///
/// Server: `secure-echo -l 9000`. Client: `secure-echo 9000 "hello"`.
/// Without a port, the address comes from the config file or environment.
#[derive(Parser, Debug)]
#[command(name = "secure-echo", version, about)]
struct Args {
    /// Listen mode: serve one echo, then exit
    #[arg(short = 'l', long = "listen")]
    listen: bool,

    /// Host to connect to when a client port is given [default: localhost]
    #[arg(long, env = "SECURE_ECHO_HOST")]
    host: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// `[port]` in listen mode, `[port] <message>` in client mode
    #[arg(value_name = "ARGS", num_args = 0..=2)]
    operands: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Server,
    Client { message: String },
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.parse::<u16>()
        .map_err(|_| ChannelError::ConfigError(format!("Invalid port '{raw}'; {USAGE}")))
}

fn usage_error() -> ChannelError {
    ChannelError::ConfigError(USAGE.to_string())
}

/// Apply the command line on top of `config` and pick the mode
fn select_mode(args: &Args, config: &mut ChannelConfig) -> Result<Mode> {
    if args.listen {
        match args.operands.as_slice() {
            [] => {}
            [port] => config.server.address = format!("0.0.0.0:{}", parse_port(port)?),
            _ => return Err(usage_error()),
        }
        return Ok(Mode::Server);
    }

    let message = match args.operands.as_slice() {
        [message] => message,
        [port, message] => {
            let host = args.host.as_deref().unwrap_or("localhost");
            config.client.address = format!("{host}:{}", parse_port(port)?);
            message
        }
        _ => return Err(usage_error()),
    };

    Ok(Mode::Client {
        message: message.clone(),
    })
}

/// Config file, then environment, then command line
fn load_config(args: &Args) -> Result<(ChannelConfig, Mode)> {
    let mut config = match &args.config {
        Some(path) => ChannelConfig::from_file(path)?,
        None => ChannelConfig::default(),
    };
    config.apply_env()?;

    let mode = select_mode(args, &mut config)?;
    config.validate_strict()?;
    Ok((config, mode))
}

async fn run(config: ChannelConfig, mode: Mode) -> Result<()> {
    match mode {
        Mode::Server => server::run(&config.server).await,
        Mode::Client { message } => {
            let mut client = SecureClient::dial(&config.client.address).await?;
            let echoed = client.echo(message.as_bytes()).await?;
            info!(bytes = echoed.len(), "Received echo");
            println!("{}", String::from_utf8_lossy(&echoed));
            Ok(())
        }
    }
}

fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "secure-echo failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: Args) -> ExitCode {
    let (config, mode) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("secure-echo: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("secure-echo: {e}");
        return ExitCode::FAILURE;
    }

    exit_code(&run(config, mode).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    execute(Args::parse()).await
}
