use crate::content::{ModerationResult, Verdict};
use crate::session::Outcome;

const BAR_CELLS: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Alert,
    Medium,
    Neutral,
}

impl Level {
    pub fn for_score(score: f64) -> Self {
        if score > 0.7 {
            Level::Alert
        } else if score > 0.4 {
            Level::Medium
        } else {
            Level::Neutral
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryBar {
    pub label: String,
    pub score: String,
    pub width_percent: f64,
    pub level: Level,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    pub verdict: Verdict,
    pub title: &'static str,
    pub confidence: String,
    pub requires_review: &'static str,
    pub categories: Vec<CategoryBar>,
    pub metadata: Vec<(&'static str, String)>,
    pub simulated: bool,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn percent(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

pub fn render(result: &ModerationResult) -> ResultView {
    let categories = result
        .categories
        .iter()
        .map(|(name, &score)| CategoryBar {
            label: capitalize(name),
            score: percent(score),
            width_percent: (score * 100.0).clamp(0.0, 100.0),
            level: Level::for_score(score),
        })
        .collect();

    let mut metadata = vec![
        ("Content ID", result.content_id.clone()),
        (
            "Timestamp",
            result
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
    ];
    if let Some(model) = &result.model {
        metadata.push(("Model", model.clone()));
    }
    if let Some(filename) = &result.filename {
        metadata.push(("Filename", filename.clone()));
    }
    if let Some(frames) = result.frames_analyzed {
        metadata.push(("Frames Analyzed", frames.to_string()));
    }

    ResultView {
        verdict: result.verdict,
        title: match result.verdict {
            Verdict::Safe => "Content is Safe",
            Verdict::Flagged => "Content Flagged",
        },
        confidence: percent(result.confidence),
        requires_review: if result.requires_review { "Yes" } else { "No" },
        categories,
        metadata,
        simulated: result.simulated,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
}

struct Rgb(u8, u8, u8);

impl Theme {
    fn text(self) -> Rgb {
        if self.dark {
            Rgb(0xe5, 0xe7, 0xeb)
        } else {
            Rgb(0x1f, 0x29, 0x37)
        }
    }

    fn track(self) -> Rgb {
        if self.dark {
            Rgb(0x37, 0x41, 0x51)
        } else {
            Rgb(0xd1, 0xd5, 0xdb)
        }
    }

    fn level(self, level: Level) -> Rgb {
        match level {
            Level::Alert => Rgb(0xef, 0x44, 0x44),
            Level::Medium => Rgb(0xf5, 0x9e, 0x0b),
            Level::Neutral => Rgb(0x10, 0xb9, 0x81),
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[38;2;{};{};{}m", self.0, self.1, self.2)
    }
}

const RESET: &str = "\x1b[0m";

/// A view painted with a theme's palette for a terminal.
pub struct Styled<'a, T> {
    pub inner: &'a T,
    pub theme: Theme,
}

impl std::fmt::Display for Styled<'_, ResultView> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.inner;
        let theme = self.theme;
        let text = theme.text();

        let (icon, badge) = match view.verdict {
            Verdict::Safe => ("✅", theme.level(Level::Neutral)),
            Verdict::Flagged => ("⚠️", theme.level(Level::Alert)),
        };
        writeln!(f, "{}{} {}{}", badge, icon, view.title, RESET)?;
        writeln!(f, "{}Confidence: {}  Requires Review: {}{}", text, view.confidence, view.requires_review, RESET)?;

        writeln!(f)?;
        writeln!(f, "{}Category Breakdown{}", text, RESET)?;
        for bar in &view.categories {
            let filled = ((bar.width_percent / 100.0) * BAR_CELLS as f64).round() as usize;
            writeln!(
                f,
                "{}{:<16} {:>6}{} {}{}{}{}{}",
                text,
                bar.label,
                bar.score,
                RESET,
                theme.level(bar.level),
                "█".repeat(filled),
                theme.track(),
                "░".repeat(BAR_CELLS - filled),
                RESET
            )?;
        }

        writeln!(f)?;
        for (label, value) in &view.metadata {
            writeln!(f, "{}{}: {}{}", text, label, value, RESET)?;
        }
        if view.simulated {
            writeln!(f, "{}Simulated: no backend was contacted{}", theme.level(Level::Medium), RESET)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Styled<'_, Outcome> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner {
            Outcome::Result(result) => write!(
                f,
                "{}",
                Styled {
                    inner: &render(result),
                    theme: self.theme,
                }
            ),
            Outcome::Error(message) => writeln!(f, "{}⚠️ {}{}", self.theme.level(Level::Alert), message, RESET),
        }
    }
}
