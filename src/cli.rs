use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

#[derive(Parser, Debug)]
#[command(
    name = "sayhi",
    author,
    version,
    about = "A gRPC client demonstrating the four streaming RPC interaction patterns",
    long_about = "sayhi exchanges short \"hi\" messages with a SayHi gRPC server using each of\n\
                  the four RPC interaction patterns: unary, client streaming, server\n\
                  streaming, and bidirectional streaming."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One hi out, one hi back
    Unary(UnaryArgs),

    /// Stream hi messages and get back how many the server counted
    ClientStream(ClientStreamArgs),

    /// Request a stream of hi messages from the server
    ServerStream(ServerStreamArgs),

    /// Exchange hi messages until the session budget elapses
    Bidi(BidiArgs),

    /// Generate a starter config file
    Init(InitArgs),
}

/// Connection flags shared by every pattern subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// gRPC server address (host:port)
    #[arg(short = 'A', long, default_value = "localhost:50051")]
    pub address: String,

    /// Fully-qualified gRPC service name
    #[arg(long, default_value = "sayhi.SayHiService")]
    pub service: String,

    /// Use TLS with system roots
    #[arg(long)]
    pub tls: bool,

    /// Request timeout (e.g. 30s)
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Connection timeout (e.g. 2s)
    #[arg(long, default_value = "2s", value_parser = parse_duration)]
    pub connect_timeout: Duration,

    /// Wall-clock budget for a bidirectional session (e.g. 2s)
    #[arg(long, value_parser = parse_duration)]
    pub budget: Option<Duration>,

    /// Config file path (TOML)
    #[arg(short = 'f', long = "config")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UnaryArgs {
    /// Display name to say hi as
    pub sender: String,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ClientStreamArgs {
    /// Display name to say hi as
    pub sender: String,

    /// Number of hi messages to send
    #[arg(short = 'n', long, default_value = "3")]
    pub count: u32,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ServerStreamArgs {
    /// Display name to say hi as
    pub sender: String,

    /// Number of hi messages to request (the server caps this at 5)
    #[arg(short = 'n', long, default_value = "5")]
    pub count: u32,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct BidiArgs {
    /// Display name to say hi as
    pub sender: String,

    /// Number of hi messages to send during the session
    #[arg(short = 'n', long, default_value = "5")]
    pub count: u32,

    /// Delay between sends (e.g. 300ms)
    #[arg(long, default_value = "300ms", value_parser = parse_duration)]
    pub interval: Duration,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output path for the generated config
    #[arg(default_value = "sayhi.toml")]
    pub output: PathBuf,

    /// Address to write into the template
    #[arg(short = 'A', long, default_value = "localhost:50051")]
    pub address: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
