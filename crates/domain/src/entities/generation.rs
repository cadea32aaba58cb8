//! Generation request and result
//!
//! A [`GenerationRequest`] bundles everything the content generator needs for
//! one run: the prompt template, the section list, the search budget and the
//! reporting window. It is built once and never mutated.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{MAX_SEARCH_BUDGET, ReportWindow, SearchBudget};

/// Which briefing a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefingProfile {
    /// Research-backed weekly AI and data engineering newsletter
    #[default]
    WeeklyNewsletter,
    /// Goal-driven daily coaching note, no web research
    DailyCoaching,
}

impl BriefingProfile {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeeklyNewsletter => "weekly_newsletter",
            Self::DailyCoaching => "daily_coaching",
        }
    }
}

impl fmt::Display for BriefingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BriefingProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "newsletter" | "weekly_newsletter" => Ok(Self::WeeklyNewsletter),
            "coaching" | "daily" | "daily_coaching" => Ok(Self::DailyCoaching),
            other => Err(DomainError::UnknownProfile(other.to_string())),
        }
    }
}

/// One section the model is asked to cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Section heading as it should appear in the output
    pub heading: String,
    /// Bullet points describing what belongs in the section
    pub guidance: Vec<String>,
}

impl Topic {
    pub fn new<I, S>(heading: impl Into<String>, guidance: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            heading: heading.into(),
            guidance: guidance.into_iter().map(Into::into).collect(),
        }
    }
}

/// Placeholders understood by [`GenerationRequest::task_prompt`]
pub mod placeholders {
    pub const START_DATE: &str = "{start_date}";
    pub const END_DATE: &str = "{end_date}";
    pub const SECTIONS: &str = "{sections}";
    pub const GOALS: &str = "{goals}";
    pub const TODAY: &str = "{today}";
    pub const DAY_OF_WEEK: &str = "{day_of_week}";
}

/// Immutable input to one content generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    profile: BriefingProfile,
    system_prompt: String,
    prompt_template: String,
    topics: Vec<Topic>,
    search_budget: u32,
    window: ReportWindow,
    goals: Option<String>,
}

impl GenerationRequest {
    /// Build a request
    ///
    /// # Errors
    ///
    /// Fails when the template is blank, no topics are given or the search
    /// budget exceeds [`MAX_SEARCH_BUDGET`].
    pub fn new(
        profile: BriefingProfile,
        system_prompt: impl Into<String>,
        prompt_template: impl Into<String>,
        topics: Vec<Topic>,
        search_budget: u32,
        window: ReportWindow,
    ) -> Result<Self, DomainError> {
        let prompt_template = prompt_template.into();
        if prompt_template.trim().is_empty() {
            return Err(DomainError::validation("prompt template must not be empty"));
        }
        if topics.is_empty() {
            return Err(DomainError::validation(
                "a generation request needs at least one topic",
            ));
        }
        if search_budget > MAX_SEARCH_BUDGET {
            return Err(DomainError::validation(format!(
                "search budget {search_budget} exceeds the limit of {MAX_SEARCH_BUDGET}"
            )));
        }
        Ok(Self {
            profile,
            system_prompt: system_prompt.into(),
            prompt_template,
            topics,
            search_budget,
            window,
            goals: None,
        })
    }

    /// Attach free-form goals text (coaching profile)
    #[must_use]
    pub fn with_goals(mut self, goals: impl Into<String>) -> Self {
        self.goals = Some(goals.into());
        self
    }

    pub const fn profile(&self) -> BriefingProfile {
        self.profile
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub const fn window(&self) -> ReportWindow {
        self.window
    }

    pub fn goals(&self) -> Option<&str> {
        self.goals.as_deref()
    }

    /// Fresh budget counter for one run
    pub const fn search_budget(&self) -> SearchBudget {
        SearchBudget::new(self.search_budget)
    }

    /// Numbered section list with indented guidance bullets
    pub fn sections_outline(&self) -> String {
        let mut out = String::new();
        for (index, topic) in self.topics.iter().enumerate() {
            out.push_str(&format!("{}) {}\n", index + 1, topic.heading));
            for line in &topic.guidance {
                out.push_str(&format!("   - {line}\n"));
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Task prompt with every placeholder substituted
    pub fn task_prompt(&self) -> String {
        use placeholders::{DAY_OF_WEEK, END_DATE, GOALS, SECTIONS, START_DATE, TODAY};

        self.prompt_template
            .replace(START_DATE, &self.window.start_label())
            .replace(END_DATE, &self.window.end_label())
            .replace(TODAY, &self.window.end_label())
            .replace(DAY_OF_WEEK, &self.window.end().format("%A").to_string())
            .replace(SECTIONS, &self.sections_outline())
            .replace(GOALS, self.goals.as_deref().unwrap_or("(no goals provided)"))
    }
}

/// Final output of the content generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    markdown: String,
    searches_used: u32,
    model: String,
    generated_at: DateTime<Utc>,
    turns: u32,
    forced_conclusion: bool,
}

impl GenerationResult {
    /// # Errors
    ///
    /// Rejects blank markdown.
    pub fn new(
        markdown: impl Into<String>,
        searches_used: u32,
        model: impl Into<String>,
        turns: u32,
    ) -> Result<Self, DomainError> {
        let markdown = markdown.into();
        if markdown.trim().is_empty() {
            return Err(DomainError::validation("generated document is empty"));
        }
        Ok(Self {
            markdown,
            searches_used,
            model: model.into(),
            generated_at: Utc::now(),
            turns,
            forced_conclusion: false,
        })
    }

    /// Mark that the last turn was forced to conclude without tools
    #[must_use]
    pub const fn with_forced_conclusion(mut self, forced: bool) -> Self {
        self.forced_conclusion = forced;
        self
    }

    #[must_use]
    pub const fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub const fn searches_used(&self) -> u32 {
        self.searches_used
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub const fn turns(&self) -> u32 {
        self.turns
    }

    pub const fn forced_conclusion(&self) -> bool {
        self.forced_conclusion
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn window() -> ReportWindow {
        ReportWindow::previous_week(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
    }

    fn topics() -> Vec<Topic> {
        vec![
            Topic::new("Top AI News", ["Major model releases", "Funding"]),
            Topic::new("Quick Strategic Takeaways", Vec::<String>::new()),
        ]
    }

    #[test]
    fn task_prompt_substitutes_window_and_sections() {
        let request = GenerationRequest::new(
            BriefingProfile::WeeklyNewsletter,
            "system",
            "Cover {start_date} to {end_date}.\n\n{sections}",
            topics(),
            15,
            window(),
        )
        .unwrap();

        let prompt = request.task_prompt();
        assert!(prompt.starts_with("Cover March 02, 2026 to March 08, 2026."));
        assert!(prompt.contains("1) Top AI News\n   - Major model releases\n   - Funding"));
        assert!(prompt.contains("2) Quick Strategic Takeaways"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn search_budget_above_ceiling_is_rejected() {
        let build = |budget| {
            GenerationRequest::new(
                BriefingProfile::WeeklyNewsletter,
                "system",
                "{sections}",
                topics(),
                budget,
                window(),
            )
        };

        assert_eq!(build(15).unwrap().search_budget().limit(), 15);
        let err = build(40).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(ref m) if m.contains("40")));
    }

    #[test]
    fn coaching_placeholders_use_window_end() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let request = GenerationRequest::new(
            BriefingProfile::DailyCoaching,
            "",
            "Today: {today} ({day_of_week})\n{goals}",
            topics(),
            0,
            ReportWindow::single_day(day),
        )
        .unwrap()
        .with_goals("- run a 10k");

        assert_eq!(
            request.task_prompt(),
            "Today: March 11, 2026 (Wednesday)\n- run a 10k"
        );
        assert!(!request.search_budget().allows_searching());
    }

    #[test]
    fn blank_template_is_rejected() {
        let result = GenerationRequest::new(
            BriefingProfile::WeeklyNewsletter,
            "",
            "   ",
            topics(),
            15,
            window(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn request_without_topics_is_rejected() {
        let result = GenerationRequest::new(
            BriefingProfile::WeeklyNewsletter,
            "",
            "prompt",
            Vec::new(),
            15,
            window(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn profile_parses_aliases() {
        assert_eq!(
            "weekly".parse::<BriefingProfile>().unwrap(),
            BriefingProfile::WeeklyNewsletter
        );
        assert_eq!(
            "Coaching".parse::<BriefingProfile>().unwrap(),
            BriefingProfile::DailyCoaching
        );
        assert!("monthly".parse::<BriefingProfile>().is_err());
    }

    #[test]
    fn result_rejects_whitespace_document() {
        assert!(GenerationResult::new(" \n\t", 3, "model", 2).is_err());
    }

    #[test]
    fn result_keeps_metadata() {
        let result = GenerationResult::new("# Top AI News", 4, "claude", 5)
            .unwrap()
            .with_forced_conclusion(true);
        assert_eq!(result.searches_used(), 4);
        assert_eq!(result.model(), "claude");
        assert_eq!(result.turns(), 5);
        assert!(result.forced_conclusion());
    }
}
