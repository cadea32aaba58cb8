//! Prompt profiles for the two briefings
//!
//! Each builder returns a complete, immutable [`GenerationRequest`].

use chrono::NaiveDate;
use domain::{BriefingProfile, DomainError, GenerationRequest, ReportWindow, Topic};

/// Section headings of the weekly newsletter, in output order
pub const NEWSLETTER_SECTIONS: [&str; 5] = [
    "Top AI News",
    "Perplexity Updates",
    "X Platform AI Updates",
    "Data Engineering & Infrastructure",
    "Quick Strategic Takeaways",
];

/// Bold labels that open each part of the coaching note
pub const COACHING_SECTIONS: [&str; 5] = [
    "Morning Intention",
    "Today's Focus",
    "Science Spotlight",
    "Accountability Check-in",
    "Daily Mantra",
];

const NEWSLETTER_SYSTEM: &str = "You are an AI research assistant and executive newsletter \
editor running inside an automated weekly workflow. You have a web_search tool; use it to \
find sources published in the requested date range and stop searching once you have enough. \
You may issue at most {budget} searches in total.";

const NEWSLETTER_TEMPLATE: &str = "\
Write the weekly AI & Data Engineering newsletter using ONLY developments published \
between {start_date} and {end_date}.

Cover these sections, in this order:

{sections}

For every item:
- Give the headline, hyperlinked to the source when possible.
- Summarize what happened in one or two sentences.
- Add one bullet starting with **Application:** describing the practical business, \
engineering or product implication.

Format:
- First line: # Weekly AI & Data Engineering Brief – {start_date} to {end_date}
- One `##` markdown heading per section, using the section names above.
- Quick Strategic Takeaways holds exactly three concise, executive-level bullets.

Tone: professional, executive-ready, concise. No speculation or rumors.
Length: 400 to 600 words.

Output only the newsletter body, with no meta commentary. If a section has too few \
credible updates from {start_date} to {end_date}, include fewer items rather than \
older material.";

const COACHING_SYSTEM: &str = "You are an experienced life coach grounded in \
evidence-based psychology, behavioural science and performance research. You write \
short, personal daily coaching notes.";

const COACHING_TEMPLATE: &str = "\
Today's date: {today}
Day of week: {day_of_week}

The reader's current goals:

{goals}

---

Write today's coaching email with these parts, each introduced by its name in bold:

{sections}

Keep the whole note warm, specific and under 350 words. Output only the email body.";

fn newsletter_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            NEWSLETTER_SECTIONS[0],
            [
                "Major model releases",
                "Enterprise AI deployments",
                "Significant research breakthroughs",
                "Funding or strategic partnerships",
            ],
        ),
        Topic::new(
            NEWSLETTER_SECTIONS[1],
            [
                "New features, product enhancements and enterprise moves",
                "Integrations or monetization changes",
            ],
        ),
        Topic::new(
            NEWSLETTER_SECTIONS[2],
            [
                "AI product launches and Grok updates",
                "AI creator tools and platform changes affecting AI distribution",
            ],
        ),
        Topic::new(
            NEWSLETTER_SECTIONS[3],
            [
                "Data platforms such as Databricks, Snowflake and BigQuery",
                "Streaming systems and lakehouse architecture",
                "Open-source tools such as Spark, dbt and Airflow",
                "MLOps and AI infrastructure",
                "Cost, governance and performance improvements",
            ],
        ),
        Topic::new(
            NEWSLETTER_SECTIONS[4],
            ["Three concise, executive-level bullets"],
        ),
    ]
}

fn coaching_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            COACHING_SECTIONS[0],
            ["Two or three grounding sentences tailored to the weekday and the goals"],
        ),
        Topic::new(
            COACHING_SECTIONS[1],
            [
                "Pick ONE goal area, rotating across the week",
                "One specific task that takes under 30 minutes today",
            ],
        ),
        Topic::new(
            COACHING_SECTIONS[2],
            ["One practical, evidence-based insight relevant to today's focus, citing the research area"],
        ),
        Topic::new(
            COACHING_SECTIONS[3],
            ["Two or three reflective questions linking yesterday's intentions to today"],
        ),
        Topic::new(
            COACHING_SECTIONS[4],
            ["One short sentence to repeat during the day"],
        ),
    ]
}

/// Weekly newsletter covering `window`, allowed `search_budget` searches
pub fn weekly_newsletter_request(
    window: ReportWindow,
    search_budget: u32,
) -> Result<GenerationRequest, DomainError> {
    GenerationRequest::new(
        BriefingProfile::WeeklyNewsletter,
        NEWSLETTER_SYSTEM.replace("{budget}", &search_budget.to_string()),
        NEWSLETTER_TEMPLATE,
        newsletter_topics(),
        search_budget,
        window,
    )
}

/// Daily coaching note for `today`, built from the reader's goals
pub fn daily_coaching_request(
    today: NaiveDate,
    goals: &str,
) -> Result<GenerationRequest, DomainError> {
    if goals.trim().is_empty() {
        return Err(DomainError::validation("goals text is empty"));
    }
    Ok(GenerationRequest::new(
        BriefingProfile::DailyCoaching,
        COACHING_SYSTEM,
        COACHING_TEMPLATE,
        coaching_topics(),
        0,
        ReportWindow::single_day(today),
    )?
    .with_goals(goals.trim()))
}
