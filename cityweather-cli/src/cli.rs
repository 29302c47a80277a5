use std::{future::Future, process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, QueryState, Status, WeatherError, WeatherQueryController, provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};

use crate::render::render_state;

const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather by city name")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show current weather for a city and exit.
    Show {
        /// City name, e.g. "Delhi" or "Paris,FR".
        city: String,
    },

    /// Search repeatedly from a prompt (the default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure().map(|()| ExitCode::SUCCESS),
            Command::Show { city } => show(&city).await,
            Command::Interactive => interactive().await.map(|()| ExitCode::SUCCESS),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let default_city = Text::new("Default city:")
        .with_default(config.default_city())
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = Some(default_city.trim().to_string()).filter(|c| !c.is_empty());
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn build_controller(config: &Config) -> anyhow::Result<Arc<WeatherQueryController>> {
    let provider = provider_from_config(config)?;
    Ok(Arc::new(WeatherQueryController::with_default_city(
        provider,
        config.default_city(),
    )))
}

/// The error text is already part of the rendered state, so a failed lookup
/// only changes the exit code.
async fn show(city: &str) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    let state = render_while(&controller, controller.search(city)).await?;
    Ok(exit_code_for(state.status()))
}

fn exit_code_for(status: Status) -> ExitCode {
    if lookup_failed(status) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn lookup_failed(status: Status) -> bool {
    status != Status::Success
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    if let Err(err) = render_while(&controller, controller.initialize()).await {
        eprintln!("{err}");
    }

    loop {
        let last_city = controller.state().city().to_string();
        let input = match prompt_city(last_city).await? {
            Some(input) => input,
            None => break,
        };
        if input.trim() == QUIT {
            break;
        }

        // Blank input only reports the validation notice.
        if let Err(err) = render_while(&controller, controller.search(&input)).await {
            eprintln!("{err}");
        }
    }

    Ok(())
}

/// Ask for a city; `None` when the user cancels the prompt.
async fn prompt_city(initial: String) -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(move || {
        Text::new("Search City:")
            .with_initial_value(&initial)
            .with_help_message("Enter to search, :q or Esc to quit")
            .prompt()
    })
    .await
    .context("Prompt task failed")?;

    match answer {
        Ok(input) => Ok(Some(input)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read city"),
    }
}

/// Drive one lookup inline, printing the loading indicator when the state
/// subscription reports `Loading` and the settled state once the lookup
/// completes. Intermediate changes are not echoed.
async fn render_while(
    controller: &WeatherQueryController,
    search: impl Future<Output = Result<(), WeatherError>>,
) -> Result<QueryState, WeatherError> {
    let mut rx = controller.subscribe();
    tokio::pin!(search);

    let mut shown_loading = false;
    let outcome = loop {
        tokio::select! {
            res = &mut search => break res,
            Ok(()) = rx.changed() => {
                if !shown_loading && rx.borrow_and_update().is_loading() {
                    println!("{}", render_state(&controller.state()));
                    shown_loading = true;
                }
            }
        }
    };
    outcome?;

    let state = controller.state();
    tracing::debug!(status = ?state.status(), "lookup settled");
    println!("{}\n", render_state(&state));
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["cityweather"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_takes_city() {
        let cli = Cli::try_parse_from(["cityweather", "show", "New Delhi"]).expect("parse");
        match cli.command {
            Some(Command::Show { city }) => assert_eq!(city, "New Delhi"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn only_a_successful_lookup_exits_cleanly() {
        assert!(!lookup_failed(Status::Success));
        assert!(lookup_failed(Status::Error));
        assert!(lookup_failed(Status::Idle));
        assert!(lookup_failed(Status::Loading));
    }

    #[test]
    fn configure_takes_no_arguments() {
        assert!(Cli::try_parse_from(["cityweather", "configure", "extra"]).is_err());
    }
}
