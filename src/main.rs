use clap::Parser;
use hashforge::configuration::Config;
use hashforge::cracking::CrackManager;
use hashforge::credentials::CredsCorrelator;
use hashforge::dumping::DumpManager;
use hashforge::process_supervision::SessionRegistry;
use hashforge::web_interface::WebServer;
use log::{error, info};
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hashforge")]
#[command(version = "0.1.0")]
#[command(about = "NTLM dumping and bruting orchestration service")]
struct Args {
    config_file: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
  hashforge v0.1.0 - NTLM dumping and bruting orchestration service
==============================================================================
"
    );

    info!("Importing configuration");

    let args = Args::parse();

    let config = match Config::from_file(Path::new(args.config_file.as_str())) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration from file: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.ensure_directories() {
        error!("Unable to prepare working directories: {:?}", e);
        std::process::exit(1);
    }

    info!("Configuration imported successfully");

    let config = Arc::new(config);

    // One registry per supervisor type; both live as long as the server.
    let crack_registry = Arc::new(SessionRegistry::new());
    let dump_registry = Arc::new(SessionRegistry::new());

    let crack = Arc::new(CrackManager::new(
        crack_registry,
        config.directories.logs.clone(),
        config.directories.cracked.clone(),
        config.directories.restores.clone(),
        config.tools.cracker_binary.clone(),
    ));
    let dump = Arc::new(DumpManager::new(
        dump_registry,
        config.directories.logs.clone(),
        config.directories.dumps.clone(),
        config.tools.dumper_binary.clone(),
    ));
    let creds = Arc::new(CredsCorrelator::new(
        config.directories.cracked.clone(),
        config.directories.dumps.clone(),
    ));

    let server = WebServer::new(config, crack, dump, creds);

    info!("Starting the web server");
    if let Err(e) = server.start().await {
        error!("Error occured in the web server: {:?}, exiting...", e);
        std::process::exit(1);
    }
}
