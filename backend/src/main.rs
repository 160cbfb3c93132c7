mod http_server;
mod session;

use clap::Parser;
use log::info;
use std::{error::Error, net::SocketAddr, path::PathBuf};
use tokio::signal;
use warp::Filter;

#[derive(Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    // A socket address for serving our HTTP web service requests.
    #[clap(env, long, default_value = "127.0.0.1:8080")]
    http_addr: SocketAddr,

    // The most sessions held in memory at once. Opening another one
    // drops the session that has gone unused the longest.
    #[clap(env, long, default_value_t = 1000)]
    max_sessions: usize,

    // How long a session may go unused before it ends along with its
    // history.
    #[clap(env, long, default_value = "30m")]
    session_idle_timeout: humantime::Duration,

    // A directory of static files to serve, usually the built frontend.
    #[clap(env, long, default_value = "frontend/dist")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder().format_timestamp_millis().init();

    // Establish the task and handle for the converter sessions
    let (session_manager, sessions) =
        session::spawn(args.max_sessions, args.session_idle_timeout.into());

    // Start up the http service
    let routes = http_server::routes(sessions).or(warp::fs::dir(args.static_dir.clone()));
    tokio::spawn(warp::serve(routes).run(args.http_addr));
    info!("HTTP listening on {}", args.http_addr);
    info!("Serving static files from {}", args.static_dir.display());

    info!("Temperature converter ready");
    tokio::select! {
        result = session_manager => result?,
        result = signal::ctrl_c() => {
            result?;
            info!("Shutting down");
        }
    }

    Ok(())
}
