mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let config = cli::settings_path(cli.config.as_deref());

    let result = match cli.command {
        Commands::Init { force } => cli::init::run(&config, force),
        Commands::Process {
            file,
            month,
            year,
            template,
            start,
            stop,
            output_dir,
        } => cli::process::run(
            &config,
            &cli::process::ProcessArgs {
                file,
                month,
                year,
                template,
                start,
                stop,
                output_dir,
            },
        ),
        Commands::Vat => cli::vat::list(&config),
        Commands::Status => cli::status::run(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
