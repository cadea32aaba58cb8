//! Subcommand execution and exit status mapping

use std::path::Path;

use anyhow::Context;
use application::FailureKind;
use chrono::NaiveDate;
use domain::BriefingProfile;
use infrastructure::{
    AppConfig, RunOptions, build_pipeline, build_renderer, build_request, load_mail_credential,
    run_date,
};
use tracing::{error, info};

use crate::cli::Commands;

/// Exit status for configuration and setup problems
pub const EXIT_CONFIG: u8 = 2;

/// Execute `command` and return the process exit status
pub async fn execute(command: Commands, config: &AppConfig) -> u8 {
    let outcome = match command {
        Commands::Run {
            profile,
            goals,
            date,
        } => run(config, profile, goals.as_deref(), date).await,
        Commands::Render {
            input,
            output,
            profile,
            date,
        } => render(config, &input, output.as_deref(), profile, date),
        Commands::CheckConfig { profile } => check_config(config, profile),
    };

    outcome.unwrap_or_else(|err| {
        error!(error = %format!("{err:#}"), "Setup failed");
        EXIT_CONFIG
    })
}

async fn run(
    config: &AppConfig,
    profile: BriefingProfile,
    goals: Option<&Path>,
    date: Option<NaiveDate>,
) -> anyhow::Result<u8> {
    let goals = match goals {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading goals file {}", path.display()))?,
        ),
        None => None,
    };
    let options = RunOptions {
        profile,
        run_date: date,
        goals,
    };

    let pipeline = build_pipeline(config, &options)?;
    let request = build_request(config, &options)?;
    let report = pipeline.run(&request).await;

    info!(
        final_state = %report.final_state,
        exit_code = report.exit_code(),
        message_id = report.receipt.as_ref().and_then(|r| r.message_id()).unwrap_or("-"),
        "Run finished"
    );
    Ok(report.exit_code())
}

fn render(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    profile: BriefingProfile,
    date: Option<NaiveDate>,
) -> anyhow::Result<u8> {
    let markdown = std::fs::read_to_string(input)
        .with_context(|| format!("reading markdown file {}", input.display()))?;
    let options = RunOptions {
        run_date: date,
        ..RunOptions::new(profile)
    };
    let renderer = build_renderer(config, &options)?;
    let email = match renderer.render_on(&markdown, run_date(config, &options)?) {
        Ok(email) => email,
        Err(err) => {
            error!(error = %err, "Rendering failed");
            return Ok(FailureKind::Render.exit_code());
        },
    };

    match output {
        Some(path) => {
            std::fs::write(path, &email.html_body)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(subject = %email.subject, path = %path.display(), "Rendered email written");
        },
        None => {
            #[allow(clippy::print_stdout)]
            {
                println!("{}", email.html_body);
            }
        },
    }
    Ok(0)
}

fn check_config(config: &AppConfig, profile: BriefingProfile) -> anyhow::Result<u8> {
    config.validate(profile)?;
    let credential = load_mail_credential(&config.mail)?;
    info!(
        %profile,
        model = %config.generation.model,
        search_budget = config.search_budget(profile),
        client_id = %credential.client_id(),
        has_access_token = credential.access_token().is_some(),
        "Configuration is valid"
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_config_exit() {
        let command = Commands::Run {
            profile: BriefingProfile::WeeklyNewsletter,
            goals: None,
            date: None,
        };
        assert_eq!(execute(command, &AppConfig::default()).await, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn unreadable_goals_file_is_config_exit() {
        let command = Commands::Run {
            profile: BriefingProfile::DailyCoaching,
            goals: Some("/nonexistent/goals.md".into()),
            date: None,
        };
        assert_eq!(execute(command, &AppConfig::default()).await, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn render_writes_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("brief.md");
        let output = dir.path().join("brief.html");
        let mut file = std::fs::File::create(&input).unwrap();
        writeln!(file, "## Top AI News\n- **Application:** Ship it.").unwrap();

        let command = Commands::Render {
            input,
            output: Some(output.clone()),
            profile: BriefingProfile::WeeklyNewsletter,
            date: NaiveDate::from_ymd_opt(2026, 3, 9),
        };
        assert_eq!(execute(command, &AppConfig::default()).await, 0);

        let html = std::fs::read_to_string(output).unwrap();
        assert!(html.contains("<h2"));
        assert!(html.contains("March 02, 2026 to March 08, 2026"));
    }

    #[tokio::test]
    async fn check_config_rejects_empty_config() {
        let command = Commands::CheckConfig {
            profile: BriefingProfile::DailyCoaching,
        };
        assert_eq!(execute(command, &AppConfig::default()).await, EXIT_CONFIG);
    }
}
