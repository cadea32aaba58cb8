//! Markdown to inline-styled HTML
//!
//! Mail clients drop `<style>` blocks, so every element gets its style
//! attribute here. Raw HTML in the source is shown as text, never passed
//! through.

use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html,
};
use tera::escape_html;

use super::theme::EmailTheme;

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Convert `markdown` into the styled body fragment
pub fn markdown_to_html(markdown: &str, theme: &EmailTheme) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let source: Vec<Event<'_>> = Parser::new_ext(markdown, options).collect();
    let styled = Styler::new(theme).transform(source);

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, styled.into_iter());
    out
}

/// Neutralise link targets that would run code when clicked
pub fn sanitize_href(dest: &str) -> &str {
    let scheme: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|blocked| scheme.starts_with(blocked)) {
        "#"
    } else {
        dest
    }
}

struct Styler<'t> {
    theme: &'t EmailTheme,
    alignments: Vec<Alignment>,
    cell: usize,
    in_head: bool,
    body_open: bool,
}

impl<'t> Styler<'t> {
    const fn new(theme: &'t EmailTheme) -> Self {
        Self {
            theme,
            alignments: Vec::new(),
            cell: 0,
            in_head: false,
            body_open: false,
        }
    }

    fn transform<'a>(mut self, source: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(source.len());
        let mut events = source.into_iter().peekable();

        while let Some(event) = events.next() {
            // **Label:** is Start(Strong), Text, End(Strong)
            let label = match (&event, events.peek()) {
                (Event::Start(Tag::Strong), Some(Event::Text(text)))
                    if self.theme.is_highlight_label(text) =>
                {
                    Some(escape_html(text))
                },
                _ => None,
            };
            let Some(label) = label else {
                out.push(self.style(event));
                continue;
            };

            events.next();
            if matches!(events.peek(), Some(Event::End(TagEnd::Strong))) {
                events.next();
                out.push(raw(format!(
                    "<strong style=\"color:{};\">{label}</strong>",
                    self.theme.accent
                )));
            } else {
                out.push(raw("<strong>".to_string()));
                out.push(raw(label));
            }
        }
        out
    }

    fn style<'a>(&mut self, event: Event<'a>) -> Event<'a> {
        let t = self.theme;
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Html(text) | Event::InlineHtml(text) => Event::Text(text),
            Event::Code(code) => raw(format!(
                "<code style=\"font-family:Menlo,Consolas,monospace;font-size:13px;background:{};padding:1px 4px;border-radius:4px;\">{}</code>",
                t.soft_background,
                escape_html(&code)
            )),
            Event::SoftBreak | Event::HardBreak => raw("<br>\n".to_string()),
            Event::Rule => raw(format!(
                "<hr style=\"border:none;border-top:1px solid {};margin:28px 0;\">\n",
                t.rule_color
            )),
            other => other,
        }
    }

    fn open<'a>(&mut self, tag: Tag<'a>) -> Event<'a> {
        let t = self.theme;
        let html = match tag {
            Tag::Paragraph => format!("<p style=\"margin:0 0 10px 0;color:{};\">", t.text_color),
            Tag::Heading { level, .. } => self.heading_open(level),
            Tag::BlockQuote(_) => format!(
                "<blockquote style=\"border-left:3px solid {};margin:0 0 14px 0;padding:8px 0 8px 16px;background:{};border-radius:0 6px 6px 0;color:{};\">\n",
                t.accent, t.soft_background, t.text_color
            ),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        format!(" data-lang=\"{}\"", escape_html(&lang))
                    },
                    _ => String::new(),
                };
                format!(
                    "<pre style=\"background:{};border:1px solid {};border-radius:6px;padding:12px;overflow-x:auto;font-size:13px;line-height:1.5;\"{lang}><code>",
                    t.soft_background, t.rule_color
                )
            },
            Tag::HtmlBlock => format!("<p style=\"margin:0 0 10px 0;color:{};\">", t.text_color),
            Tag::List(Some(start)) => {
                let start_attr = if start == 1 {
                    String::new()
                } else {
                    format!(" start=\"{start}\"")
                };
                format!("<ol{start_attr} style=\"margin:6px 0 14px 0;padding-left:20px;\">\n")
            },
            Tag::List(None) => "<ul style=\"margin:6px 0 14px 0;padding-left:20px;\">\n".to_string(),
            Tag::Item => format!("<li style=\"margin-bottom:6px;color:{};\">", t.text_color),
            Tag::Emphasis => "<em>".to_string(),
            Tag::Strong => "<strong>".to_string(),
            Tag::Strikethrough => "<del>".to_string(),
            Tag::Link {
                dest_url, title, ..
            } => {
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", escape_html(&title))
                };
                format!(
                    "<a href=\"{}\"{title_attr} style=\"color:{};text-decoration:none;font-weight:500;\">",
                    escape_html(sanitize_href(&dest_url)),
                    t.accent
                )
            },
            // Alt text is emitted as plain text between the image tags
            Tag::Image { .. } => String::new(),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.body_open = false;
                format!(
                    "<table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" style=\"width:100%;border-collapse:collapse;margin:0 0 14px 0;font-size:14px;color:{};\">\n",
                    t.text_color
                )
            },
            Tag::TableHead => {
                self.in_head = true;
                self.cell = 0;
                "<thead><tr>".to_string()
            },
            Tag::TableRow => {
                self.cell = 0;
                if self.body_open {
                    "<tr>".to_string()
                } else {
                    self.body_open = true;
                    "<tbody>\n<tr>".to_string()
                }
            },
            Tag::TableCell => self.cell_open(),
            other => return Event::Start(other),
        };
        raw(html)
    }

    fn close<'a>(&mut self, tag: TagEnd) -> Event<'a> {
        let html = match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => "</p>\n",
            TagEnd::Heading(level) => match level {
                HeadingLevel::H1 => "</h1>\n",
                HeadingLevel::H2 => "</h2>\n",
                _ => "</h3>\n",
            },
            TagEnd::BlockQuote(_) => "</blockquote>\n",
            TagEnd::CodeBlock => "</code></pre>\n",
            TagEnd::List(true) => "</ol>\n",
            TagEnd::List(false) => "</ul>\n",
            TagEnd::Item => "</li>\n",
            TagEnd::Emphasis => "</em>",
            TagEnd::Strong => "</strong>",
            TagEnd::Strikethrough => "</del>",
            TagEnd::Link => "</a>",
            TagEnd::Image => "",
            TagEnd::Table => {
                self.alignments.clear();
                if self.body_open {
                    "</tbody>\n</table>\n"
                } else {
                    "</table>\n"
                }
            },
            TagEnd::TableHead => {
                self.in_head = false;
                "</tr></thead>\n"
            },
            TagEnd::TableRow => "</tr>\n",
            TagEnd::TableCell => {
                self.cell += 1;
                if self.in_head { "</th>" } else { "</td>" }
            },
            other => return Event::End(other),
        };
        raw(html.to_string())
    }

    fn heading_open(&self, level: HeadingLevel) -> String {
        let t = self.theme;
        match level {
            HeadingLevel::H1 => format!(
                "<h1 style=\"font-size:20px;font-weight:700;color:{};margin:0 0 16px 0;line-height:1.3;\">",
                t.heading_color
            ),
            HeadingLevel::H2 if t.uppercase_sections => format!(
                "<h2 style=\"font-size:13px;font-weight:700;letter-spacing:1.5px;text-transform:uppercase;color:{};margin:32px 0 14px 0;padding-bottom:8px;border-bottom:2px solid {};\">",
                t.accent, t.rule_color
            ),
            HeadingLevel::H2 => format!(
                "<h2 style=\"font-size:15px;font-weight:700;color:{};margin:20px 0 8px 0;\">",
                t.heading_color
            ),
            _ => format!(
                "<h3 style=\"font-size:15px;font-weight:600;color:{};margin:20px 0 6px 0;\">",
                t.heading_color
            ),
        }
    }

    fn cell_open(&self) -> String {
        let align = match self.alignments.get(self.cell) {
            Some(Alignment::Center) => "center",
            Some(Alignment::Right) => "right",
            _ => "left",
        };
        if self.in_head {
            format!(
                "<th style=\"text-align:{align};padding:6px 8px;border-bottom:2px solid {};font-weight:600;\">",
                self.theme.rule_color
            )
        } else {
            format!(
                "<td style=\"text-align:{align};padding:6px 8px;border-bottom:1px solid {};\">",
                self.theme.rule_color
            )
        }
    }
}

fn raw<'a>(html: String) -> Event<'a> {
    Event::Html(CowStr::from(html))
}
