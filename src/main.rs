use std::{env, io};

use anyhow::{bail, Result};
use flashcards_cli_rs::{config::Config, repl, server, Session};
use shadow_rs::shadow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

shadow!(build);

const USAGE: &str = "\
usage: flashcards-cli-rs [command]

  serve [addr]   serve the flashcards page (default)
  repl           flashcards in the terminal
  version        print build information";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => serve(args.get(1).map(String::as_str)),
        Some("repl") => {
            env_logger::init();
            let mut session = Session::new();
            repl::run(&mut session, io::stdin().lock(), io::stdout())
        }
        Some("version" | "--version" | "-V") => {
            println!(
                "{} {} ({} {})",
                build::PROJECT_NAME,
                build::PKG_VERSION,
                build::SHORT_COMMIT,
                build::BUILD_TIME
            );
            Ok(())
        }
        Some("help" | "--help" | "-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }
}

#[tokio::main]
async fn serve(listen: Option<&str>) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashcards_cli_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load()?;
    if let Some(listen) = listen {
        config.set_listen(listen)?;
    }
    server::serve(&config).await
}
