use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use std::{net::SocketAddr, path::PathBuf, process};
use warp::Filter;

mod routes;

use coursereview::config::Config;
use db::new_db;
use routes::{handle_rejection, routes};

/// Development backend of the course review application.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }

    setup_logging(config.log_level);

    let global_db = new_db(config.database.clone());
    let filters = routes(&global_db);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allow_headers(vec!["content-type", "Authorization"]);

    let filters = filters
        .with(cors)
        // Before logging for correct status codes
        .recover(handle_rejection)
        .with(warp::log("coursereview"));

    let address = SocketAddr::new(config.address, config.port);
    log::info!("serving {} on http://{}", config.database, address);
    warp::serve(filters).run(address).await;
}

fn setup_logging(level: log::LevelFilter) {
    let colors = ColoredLevelConfig::new().debug(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}{} {}",
                colors.color(record.level()),
                chrono::Local::now().format("[%H:%M:%S]"),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .expect("Could not apply logging configuration");
}
