use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use student_registry::utils::{logger, validation::Validate};
use student_registry::{app, CliConfig, FileStorage, RegistryConfig, RegistryStore, StudentDb};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None => RegistryConfig::default(),
    };

    logger::init_cli_logger(cli.verbose, &config.logging.level, config.logging.json);
    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let data_file = cli
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.data_file));
    let storage = FileStorage::new(data_file, config.storage.create_if_missing);
    let mut db = StudentDb::with_first_matrikel_number(config.registry.first_matrikel_number);

    let result = storage.load_into(&mut db).and_then(|()| {
        let output = app::execute(&cli.command, &mut db, cli.json)?;
        if cli.command.is_mutating() {
            storage.save(&db)?;
        }
        Ok(output)
    });

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Command failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
