use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use helmrelease_executor::{
    config::{ExecutorConfig, DEFAULT_INTERVAL, DEFAULT_TIMEOUT},
    controller::{self, ExecutionContext, KubeReleaseClient},
    payload, Error,
};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform on the HelmRelease object. Must be either install or delete
    #[arg(long, env = "EXECUTOR_ACTION")]
    action: String,

    /// Timeout for the execution of the workflow task
    #[arg(long, env = "EXECUTOR_TIMEOUT", default_value = DEFAULT_TIMEOUT)]
    timeout: String,

    /// Retry interval for all actions performed by the executor
    #[arg(long, env = "EXECUTOR_INTERVAL", default_value = DEFAULT_INTERVAL)]
    interval: String,

    /// Base64 encoded HelmRelease manifest to be parsed by the executor
    #[arg(long, env = "EXECUTOR_DATA", default_value = "", hide_env_values = true)]
    data: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_format);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let config = ExecutorConfig::new(&args.action, &args.timeout, &args.interval, &args.data)?;
    info!(
        "Parsed the action: {}, the timeout: {:?} and the interval: {:?}",
        config.action, config.timeout, config.interval
    );

    let bytes = payload::decode_base64(&config.data)?;
    let descriptor = payload::decode(&bytes)?;

    let ctx = ExecutionContext::new(config.timeout, config.interval);

    // Reads kubeconfig, falling back to the in-cluster service account
    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;
    info!("Connected to Kubernetes cluster");

    let releases = KubeReleaseClient::new(client);
    controller::run_action(config.action, &ctx, &releases, &descriptor).await
}
