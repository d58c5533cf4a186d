//! diplug - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `diplug install` | Scaffold the runtime configuration directory |
//! | `diplug uninstall` | Remove it |
//! | `diplug status` | Show layout, environment and installation state |
//! | `diplug check [--service ID]...` | Build the container and resolve entries |

use clap::Parser;
use diplug::cli::Cli;
use diplug::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.logging_config())?;

    let report = cli.execute().await?;
    println!("{report}");
    Ok(())
}
