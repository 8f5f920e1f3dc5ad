//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, storage and the provider the way a host would.
//! - Print a deterministic summary of the configured store.

use petstore_core::contract::collection_uri;
use petstore_core::db::open_db;
use petstore_core::{
    core_version, init_logging, ChangeHub, PetProvider, RouteTable, Selection,
    SqlitePetRepository, StoreConfig,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("petstore: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let repo = SqlitePetRepository::try_new(&conn)?;
    let routes = RouteTable::for_authority(&config.authority)?;
    let provider = PetProvider::new(repo, routes, ChangeHub::new());

    let address = collection_uri(&config.authority);
    let cursor = provider.query(&address, &Selection::all(), None)?;
    let content_type = provider.get_type(&address)?;
    log::info!(
        "event=cli_probe module=cli status=ok address={} pets={}",
        address,
        cursor.len()
    );

    println!("petstore_core version={}", core_version());
    println!("petstore db={}", config.db_path.display());
    println!("petstore address={address} type={}", content_type.as_str());
    println!("petstore pets={}", cursor.len());
    Ok(())
}
