mod bot;
mod commands;
mod monitor;
mod types;

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    if let Err(e) = runtime.block_on(bot::run()) {
        eprintln!("Error starting bot: {}", e);
        std::process::exit(1);
    }
}
