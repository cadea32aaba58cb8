//! Composition root - builds a ready-to-run pipeline from configuration

use std::sync::Arc;

use application::ports::{
    ConversationPort, CredentialProvider, CredentialStorePort, RendererPort, WebSearchPort,
};
use application::{
    ContentGenerator, CredentialManager, MailDispatcher, NewsletterPipeline,
    daily_coaching_request, weekly_newsletter_request,
};
use chrono::NaiveDate;
use domain::{BriefingProfile, GenerationRequest, ReportWindow};
use tracing::{debug, info};

use crate::adapters::{
    AnthropicConversationAdapter, BraveSearchAdapter, DisabledSearchAdapter, FileCredentialStore,
    GmailTokenRefresher, GmailTransportAdapter,
};
use crate::config::{AppConfig, ConfigError};
use crate::credentials::load_mail_credential;
use crate::rendering::MarkdownEmailRenderer;

/// Per-run choices made on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub profile: BriefingProfile,
    /// Overrides the clock in the configured timezone
    pub run_date: Option<NaiveDate>,
    /// Goals text for the coaching profile
    pub goals: Option<String>,
}

impl RunOptions {
    pub const fn new(profile: BriefingProfile) -> Self {
        Self {
            profile,
            run_date: None,
            goals: None,
        }
    }
}

/// Run date in the configured timezone unless pinned
pub fn run_date(config: &AppConfig, options: &RunOptions) -> Result<NaiveDate, ConfigError> {
    match options.run_date {
        Some(date) => Ok(date),
        None => Ok(chrono::Utc::now()
            .with_timezone(&config.render.tz()?)
            .date_naive()),
    }
}

/// Build the immutable generation request for this run
pub fn build_request(
    config: &AppConfig,
    options: &RunOptions,
) -> Result<GenerationRequest, ConfigError> {
    let date = run_date(config, options)?;
    let request = match options.profile {
        BriefingProfile::WeeklyNewsletter => weekly_newsletter_request(
            ReportWindow::previous_week(date),
            config.search_budget(options.profile),
        ),
        BriefingProfile::DailyCoaching => {
            let goals = options.goals.as_deref().ok_or_else(|| {
                ConfigError::Invalid("the coaching profile needs a goals file (--goals)".into())
            })?;
            daily_coaching_request(date, goals)
        },
    };
    request.map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Build the renderer for `options.profile`
pub fn build_renderer(
    config: &AppConfig,
    options: &RunOptions,
) -> Result<MarkdownEmailRenderer, ConfigError> {
    let renderer = MarkdownEmailRenderer::new(options.profile, config.render.tz()?)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?
        .with_subject_prefix(config.render.subject_prefix.clone())
        .with_run_date(options.run_date);
    Ok(renderer)
}

/// Wire adapters and services into a pipeline
///
/// Validates the configuration and loads the mail credential first, so a
/// bad setup fails here before any network call.
pub fn build_pipeline(
    config: &AppConfig,
    options: &RunOptions,
) -> Result<NewsletterPipeline, ConfigError> {
    config.validate(options.profile)?;
    let adapter_error = |e: application::ApplicationError| ConfigError::Invalid(e.to_string());

    let conversation: Arc<dyn ConversationPort> = Arc::new(
        AnthropicConversationAdapter::new(config.generation.anthropic_config())
            .map_err(adapter_error)?,
    );
    let search: Arc<dyn WebSearchPort> = if config.search_budget(options.profile) > 0 {
        Arc::new(BraveSearchAdapter::new(&config.websearch).map_err(adapter_error)?)
    } else {
        debug!("Search budget is zero, web search disabled");
        Arc::new(DisabledSearchAdapter)
    };
    let generator = ContentGenerator::new(
        conversation,
        search,
        config
            .generation
            .generator_settings(config.websearch.max_results),
    );

    let renderer: Arc<dyn RendererPort> = Arc::new(build_renderer(config, options)?);

    let credential = load_mail_credential(&config.mail)?;
    let refresher = GmailTokenRefresher::new(config.mail.timeout()).map_err(adapter_error)?;
    let mut manager = CredentialManager::new(credential, Arc::new(refresher));
    let persist_to = config
        .mail
        .token_path
        .as_ref()
        .filter(|_| config.mail.persist_refreshed_token);
    if let Some(path) = persist_to {
        let store: Arc<dyn CredentialStorePort> = Arc::new(FileCredentialStore::new(path));
        manager = manager.with_store(store);
    }
    let credentials: Arc<dyn CredentialProvider> = Arc::new(manager);

    let transport =
        GmailTransportAdapter::new(config.mail.gmail_config()).map_err(adapter_error)?;
    let dispatcher = MailDispatcher::new(Arc::new(transport))
        .with_sender(config.mail.sender()?)
        .with_retry(config.mail.retry());

    let recipient = config.mail.recipient()?;
    info!(
        profile = %options.profile,
        model = %config.generation.model,
        search_budget = config.search_budget(options.profile),
        "Pipeline assembled"
    );

    Ok(NewsletterPipeline::new(
        generator,
        renderer,
        dispatcher,
        credentials,
        recipient,
    ))
}
