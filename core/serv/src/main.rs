use actix_web::web::Data;
use actix_web::{middleware, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tf_file_logging::{start_logger, LogSettings};
use tf_persistence::DbExecutor;
use tf_tender::rest_api;
use tf_tender::{Config, IdentityDb, TenderService};

#[derive(Parser, Debug)]
#[clap(about = clap::crate_description!(), version)]
struct CliArgs {
    /// Address the REST API listens on
    #[clap(long, env = "SERVER_ADDRESS", default_value = "0.0.0.0:8080")]
    address: String,

    /// SQLite database file
    #[clap(long, env = "DATABASE_URL", default_value = "tender.db")]
    database_url: String,

    /// Duplicate logs into rotated files in this directory
    #[clap(long, env = "TENDER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log on debug level
    #[clap(long)]
    debug: bool,

    #[clap(flatten)]
    config: Config,
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    let settings = LogSettings {
        log_dir: args.log_dir.clone(),
        debug: args.debug,
        ..LogSettings::default()
    }
    .module("actix_server", "info")
    .module("actix_web", "info");
    let _logger = start_logger(&settings)?;

    let db = DbExecutor::with_options(&args.database_url, args.config.db.options())
        .with_context(|| format!("Failed to open database {}", args.database_url))?;
    let identity = Arc::new(IdentityDb::new(db.clone()));
    let service = Arc::new(TenderService::new(db, identity, Arc::new(args.config.clone()))?);

    log::info!(
        "Starting {} on {}",
        clap::crate_name!(),
        args.address
    );
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(Data::new(service.clone()))
            .service(rest_api::api_scope())
    })
    .bind(&args.address)
    .with_context(|| format!("Failed to bind http server on {}", args.address))?
    .run()
    .await?;

    log::info!("{} stopped", clap::crate_name!());
    Ok(())
}
