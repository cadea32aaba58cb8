//! Email renderer
//!
//! Turns the generated markdown into a [`RenderedEmail`]: a subject dated in
//! the configured zone, an inline-styled HTML body wrapped in the profile's
//! layout, and the markdown itself as the plain-text alternative.

mod markdown;
mod theme;

use std::fmt;
use std::sync::Arc;

use application::{RenderError, RendererPort};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use domain::{BriefingProfile, RenderedEmail, ReportWindow};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

pub use markdown::{markdown_to_html, sanitize_href};
pub use theme::{COACHING_THEME, EmailTheme, NEWSLETTER_THEME};

const LAYOUT_NAME: &str = "email.html";
const LAYOUT: &str = include_str!("layout.html");

#[derive(Serialize)]
struct LayoutContext<'a> {
    subject: &'a str,
    subtitle: &'a str,
    body: &'a str,
    theme: &'a EmailTheme,
}

#[derive(Clone)]
pub struct MarkdownEmailRenderer {
    profile: BriefingProfile,
    theme: &'static EmailTheme,
    timezone: Tz,
    subject_prefix: Option<String>,
    run_date: Option<NaiveDate>,
    tera: Arc<Tera>,
}

impl fmt::Debug for MarkdownEmailRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownEmailRenderer")
            .field("profile", &self.profile)
            .field("timezone", &self.timezone)
            .field("subject_prefix", &self.subject_prefix)
            .field("run_date", &self.run_date)
            .finish_non_exhaustive()
    }
}

impl MarkdownEmailRenderer {
    pub fn new(profile: BriefingProfile, timezone: Tz) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(LAYOUT_NAME, LAYOUT)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        Ok(Self {
            profile,
            theme: EmailTheme::for_profile(profile),
            timezone,
            subject_prefix: None,
            run_date: None,
            tera: Arc::new(tera),
        })
    }

    /// Replace the profile's default subject prefix
    #[must_use]
    pub fn with_subject_prefix(mut self, prefix: Option<String>) -> Self {
        self.subject_prefix = prefix.filter(|p| !p.trim().is_empty());
        self
    }

    /// Pin the date used for subjects instead of the clock
    #[must_use]
    pub fn with_run_date(mut self, date: Option<NaiveDate>) -> Self {
        self.run_date = date;
        self
    }

    /// Today's date in the delivery zone, or the pinned run date
    pub fn today(&self) -> NaiveDate {
        self.run_date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.timezone).date_naive())
    }

    /// Subject line for a run on `date`
    pub fn subject_on(&self, date: NaiveDate) -> String {
        let prefix = self
            .subject_prefix
            .as_deref()
            .unwrap_or(self.theme.default_subject);
        format!("{prefix} – {}", self.dateline(date))
    }

    fn dateline(&self, date: NaiveDate) -> String {
        match self.profile {
            BriefingProfile::WeeklyNewsletter => {
                let window = ReportWindow::previous_week(date);
                format!("{} to {}", window.start_label(), window.end_label())
            },
            BriefingProfile::DailyCoaching => date.format("%A, %B %d").to_string(),
        }
    }

    fn subtitle(&self, date: NaiveDate) -> String {
        match self.profile {
            BriefingProfile::WeeklyNewsletter => self.dateline(date),
            BriefingProfile::DailyCoaching => date.format("%A, %B %d, %Y").to_string(),
        }
    }

    /// Render as if run on `date`; output depends only on the inputs
    pub fn render_on(&self, markdown: &str, date: NaiveDate) -> Result<RenderedEmail, RenderError> {
        let subject = self.subject_on(date);
        let subtitle = self.subtitle(date);
        let body = markdown_to_html(markdown, self.theme);

        let context = Context::from_serialize(LayoutContext {
            subject: &subject,
            subtitle: &subtitle,
            body: &body,
            theme: self.theme,
        })
        .map_err(|e| RenderError::Template(e.to_string()))?;

        let html = self
            .tera
            .render(LAYOUT_NAME, &context)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        debug!(profile = %self.profile, html_bytes = html.len(), "Rendered email");
        Ok(RenderedEmail::new(subject, html, markdown))
    }
}

impl RendererPort for MarkdownEmailRenderer {
    fn render(&self, markdown: &str) -> Result<RenderedEmail, RenderError> {
        self.render_on(markdown, self.today())
    }
}
