use clap::Parser;
use console::style;
use gasboard_tui::App;
use gasboard_utils::{config::Config, disk_storage::DiskStorageInterface, log::init_logging};

use crate::cli::{Cli, Commands};

mod cli;
mod panic_hook;

#[tokio::main]
async fn main() -> gasboard_tui::Result<()> {
    let cli = Cli::parse();

    match &cli.cmd {
        Some(Commands::Config) => {
            let mut config = Config::load()?;
            cli.apply_overrides(&mut config);
            println!(
                "{} {}\n",
                style("config:").bold(),
                style(Config::path()?.display()).cyan()
            );
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Some(Commands::InitConfig { force }) => {
            let path = Config::path()?;
            if path.exists() && !*force {
                eprintln!(
                    "{} {} already exists, pass --force to overwrite",
                    style("error:").red(),
                    style(path.display()).yellow(),
                );
                std::process::exit(1);
            }
            Config::default().save()?;
            println!("{} {}", style("wrote").green(), path.display());
            return Ok(());
        }
        None => {}
    }

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    let log_path = init_logging(&config.log_level)?;
    tracing::info!(path = %log_path.display(), mode = %config.default_mode, "gasboard starting");

    panic_hook::set();

    let mut app = App::new(config, cli.chain)?;
    app.run().await?;

    tracing::info!("gasboard stopped");
    Ok(())
}
