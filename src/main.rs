use clap::Parser;

use spoopaboot::cli::command::{Cli, ColorChoice};
use spoopaboot::cli::{dispatch, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = dispatch(&cli).await {
        output::error(&format!("{e}"));
        std::process::exit(e.exit_code());
    }
}
