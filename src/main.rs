use clap::Parser;
use sayhi::cli::{
    BidiArgs, Cli, ClientStreamArgs, Commands, ConnectArgs, InitArgs, ServerStreamArgs, UnaryArgs,
};
use sayhi::client::SayHiClient;
use sayhi::config::{self, ClientConfig};
use sayhi::output::{print_json, print_report};
use sayhi::proto::HiResponse;
use sayhi::transport::GrpcTransport;
use sayhi::types::{Pattern, RunReport};
use std::time::Instant;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32, String> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Unary(args) => run_unary(&args).await,
        Commands::ClientStream(args) => run_client_stream(&args).await,
        Commands::ServerStream(args) => run_server_stream(&args).await,
        Commands::Bidi(args) => run_bidi(&args).await,
        Commands::Init(args) => run_init(&args),
    }
}

fn resolve_config(connect: &ConnectArgs) -> Result<ClientConfig, String> {
    let toml = match &connect.config {
        Some(path) => Some(config::load_config(path)?),
        None => None,
    };
    Ok(config::merge_config(connect, toml))
}

async fn connect(config: &ClientConfig) -> Result<SayHiClient<GrpcTransport>, String> {
    let transport = GrpcTransport::connect(&config.target)
        .await
        .map_err(|e| e.to_string())?;

    Ok(SayHiClient::new(transport).with_session_budget(config.session_budget))
}

fn emit(report: &RunReport, json: bool) -> Result<i32, String> {
    if json {
        print_json(report)?;
    } else {
        print_report(report);
    }
    Ok(if report.is_success() { 0 } else { 1 })
}

fn describe(response: &HiResponse) -> String {
    format!("{} (from {})", response.message, response.sender)
}

async fn run_unary(args: &UnaryArgs) -> Result<i32, String> {
    let config = resolve_config(&args.connect)?;
    let client = connect(&config).await?;

    let start = Instant::now();
    let mut report = RunReport::new(Pattern::Unary, &args.sender);
    report.sent = 1;

    match client.say_hi(&args.sender).await {
        Ok(response) => {
            report.received = 1;
            report.responses.push(describe(&response));
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report.elapsed_ms = start.elapsed().as_millis() as u64;

    emit(&report, args.connect.json)
}

async fn run_client_stream(args: &ClientStreamArgs) -> Result<i32, String> {
    let config = resolve_config(&args.connect)?;
    let client = connect(&config).await?;

    let start = Instant::now();
    let mut report = RunReport::new(Pattern::ClientStream, &args.sender);

    match client.client_stream_hi(&args.sender, args.count).await {
        Ok(response) => {
            report.sent = args.count as u64;
            report.received = 1;
            report.responses.push(format!(
                "{} (server counted {})",
                response.message, response.received_count
            ));
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report.elapsed_ms = start.elapsed().as_millis() as u64;

    emit(&report, args.connect.json)
}

async fn run_server_stream(args: &ServerStreamArgs) -> Result<i32, String> {
    let config = resolve_config(&args.connect)?;
    let client = connect(&config).await?;

    let start = Instant::now();
    let mut report = RunReport::new(Pattern::ServerStream, &args.sender);

    match client.server_stream_hi(&args.sender, args.count).await {
        Ok(mut responses) => {
            report.sent = 1;
            while let Some(item) = responses.recv().await {
                match item {
                    Ok(response) => {
                        report.received += 1;
                        report.responses.push(describe(&response));
                    }
                    Err(e) => {
                        report.error = Some(e.to_string());
                        break;
                    }
                }
            }
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report.elapsed_ms = start.elapsed().as_millis() as u64;

    emit(&report, args.connect.json)
}

async fn run_bidi(args: &BidiArgs) -> Result<i32, String> {
    let config = resolve_config(&args.connect)?;
    let client = connect(&config).await?;

    let start = Instant::now();
    let mut report = RunReport::new(Pattern::BidiStream, &args.sender);

    let mut session = client.bidirectional_hi(&args.sender);
    let handle = session.handle();
    let count = args.count;
    let interval = args.interval;

    // Sends run in their own task so the session can stay parked on recv.
    let sends = tokio::spawn(async move {
        let mut sent = 0u64;
        for i in 1..=count {
            if handle.send(&format!("hi #{}", i)).await.is_err() {
                break;
            }
            sent += 1;
            tokio::time::sleep(interval).await;
        }
        sent
    });

    // Drain until the session completes: budget elapsed, server closed, or
    // transport error — all converge on the same completion.
    while let Some(response) = session.recv().await {
        report.received += 1;
        report.responses.push(describe(&response));
    }

    report.sent = sends.await.unwrap_or(0);
    report.elapsed_ms = start.elapsed().as_millis() as u64;

    emit(&report, args.connect.json)
}

fn run_init(args: &InitArgs) -> Result<i32, String> {
    use std::fs;

    if args.output.exists() && !args.force {
        return Err(format!(
            "File '{}' already exists. Use --force to overwrite.",
            args.output.display()
        ));
    }

    fs::write(&args.output, config::config_template(&args.address))
        .map_err(|e| format!("Failed to write config: {}", e))?;

    eprintln!("Wrote starter config to {}", args.output.display());
    Ok(0)
}
