//! Colour schemes and fixed copy of the two email layouts

use domain::BriefingProfile;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmailTheme {
    /// Small uppercase line above the title
    pub kicker: &'static str,
    pub title: &'static str,
    pub default_subject: &'static str,
    pub page_background: &'static str,
    pub card_width_px: u32,
    pub header_from: &'static str,
    pub header_to: &'static str,
    pub kicker_color: &'static str,
    pub subtitle_color: &'static str,
    /// Links, section headings, highlighted labels, quote border
    pub accent: &'static str,
    pub heading_color: &'static str,
    pub text_color: &'static str,
    pub soft_background: &'static str,
    pub rule_color: &'static str,
    pub footer_background: &'static str,
    pub footer_text_color: &'static str,
    pub footer: &'static [&'static str],
    /// Bold labels rendered in the accent colour, matched without a trailing colon
    #[serde(skip)]
    pub highlight_labels: &'static [&'static str],
    /// Section headings use the small uppercase style
    pub uppercase_sections: bool,
}

pub const NEWSLETTER_THEME: EmailTheme = EmailTheme {
    kicker: "Weekly Intelligence Brief",
    title: "AI & Data Engineering",
    default_subject: "Weekly AI & Data Engineering Brief",
    page_background: "#f1f5f9",
    card_width_px: 640,
    header_from: "#0f172a",
    header_to: "#1e3a5f",
    kicker_color: "#93c5fd",
    subtitle_color: "#94a3b8",
    accent: "#2563eb",
    heading_color: "#0f172a",
    text_color: "#334155",
    soft_background: "#f8fafc",
    rule_color: "#e2e8f0",
    footer_background: "#f8fafc",
    footer_text_color: "#94a3b8",
    footer: &["Generated automatically every Monday", "AI & Data Engineering Brief"],
    highlight_labels: &["Application"],
    uppercase_sections: true,
};

pub const COACHING_THEME: EmailTheme = EmailTheme {
    kicker: "Daily Coaching",
    title: "Good morning",
    default_subject: "Your Daily Coaching",
    page_background: "#f0fdf4",
    card_width_px: 600,
    header_from: "#064e3b",
    header_to: "#0f766e",
    kicker_color: "#6ee7b7",
    subtitle_color: "#a7f3d0",
    accent: "#0f766e",
    heading_color: "#064e3b",
    text_color: "#334155",
    soft_background: "#f0fdf4",
    rule_color: "#d1fae5",
    footer_background: "#f0fdf4",
    footer_text_color: "#6b7280",
    footer: &["Your daily coach", "Delivered every morning"],
    highlight_labels: &[
        "Morning Intention",
        "Today's Focus",
        "Science Spotlight",
        "Accountability Check-in",
        "Daily Mantra",
    ],
    uppercase_sections: false,
};

impl EmailTheme {
    pub const fn for_profile(profile: BriefingProfile) -> &'static Self {
        match profile {
            BriefingProfile::WeeklyNewsletter => &NEWSLETTER_THEME,
            BriefingProfile::DailyCoaching => &COACHING_THEME,
        }
    }

    pub(crate) fn is_highlight_label(&self, text: &str) -> bool {
        let label = text.trim().trim_end_matches(':').trim_end();
        self.highlight_labels.contains(&label)
    }
}
