//! citymap - CityGML schema mapping tool.

use clap::Parser;

use citymap_cli::{run, Args};

fn main() {
    // Initialize tracing; logs go to stderr so that output can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citymap=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config();
    tracing::debug!(
        inputs = config.inputs.len(),
        format = %config.format,
        "configuration loaded"
    );

    match run(&config) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
