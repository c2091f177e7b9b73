//! Notification templates with `%Placeholder` tokens.

use crate::config::toml_config::DEFAULT_NOTIFICATION_FORMAT;
use crate::domain::model::CatalogEntry;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Id,
    Artist,
    Author,
    Title,
    Album,
    Lead,
    Rhythm,
    Bass,
    CreationDate,
    ModifiedDate,
    Downloads,
    IsVocals,
    Url,
    IsLead,
    IsRhythm,
    IsBass,
    IsPc,
}

impl Placeholder {
    pub const ALL: &'static [Placeholder] = &[
        Placeholder::Id,
        Placeholder::Artist,
        Placeholder::Author,
        Placeholder::Title,
        Placeholder::Album,
        Placeholder::Lead,
        Placeholder::Rhythm,
        Placeholder::Bass,
        Placeholder::CreationDate,
        Placeholder::ModifiedDate,
        Placeholder::Downloads,
        Placeholder::IsVocals,
        Placeholder::Url,
        Placeholder::IsLead,
        Placeholder::IsRhythm,
        Placeholder::IsBass,
        Placeholder::IsPc,
    ];

    /// Token name as written after the `%`.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Id => "ID",
            Placeholder::Artist => "Artist",
            Placeholder::Author => "Author",
            Placeholder::Title => "Title",
            Placeholder::Album => "Album",
            Placeholder::Lead => "Lead",
            Placeholder::Rhythm => "Rhythm",
            Placeholder::Bass => "Bass",
            Placeholder::CreationDate => "CreationDate",
            Placeholder::ModifiedDate => "ModifiedDate",
            Placeholder::Downloads => "Downloads",
            Placeholder::IsVocals => "IsVocals",
            Placeholder::Url => "URL",
            Placeholder::IsLead => "IsLead",
            Placeholder::IsRhythm => "IsRhythm",
            Placeholder::IsBass => "IsBass",
            Placeholder::IsPc => "IsPC",
        }
    }

    pub fn display(self, entry: &CatalogEntry) -> String {
        match self {
            Placeholder::Id => entry.id.to_string(),
            Placeholder::Artist => text(&entry.artist),
            Placeholder::Author => text(&entry.author),
            Placeholder::Title => text(&entry.title),
            Placeholder::Album => text(&entry.album),
            Placeholder::Lead => text(&entry.lead),
            Placeholder::Rhythm => text(&entry.rhythm),
            Placeholder::Bass => text(&entry.bass),
            Placeholder::CreationDate => date(&entry.created_at),
            Placeholder::ModifiedDate => date(&entry.modified_at),
            Placeholder::Downloads => entry.downloads.map(|d| d.to_string()).unwrap_or_default(),
            Placeholder::IsVocals => entry
                .has_lyrics
                .map(|v| yes_no(v).to_string())
                .unwrap_or_default(),
            Placeholder::Url => text(&entry.download_url),
            Placeholder::IsLead => yes_no(entry.is_lead()).to_string(),
            Placeholder::IsRhythm => yes_no(entry.is_rhythm()).to_string(),
            Placeholder::IsBass => yes_no(entry.is_bass()).to_string(),
            Placeholder::IsPc => yes_no(entry.is_pc()).to_string(),
        }
    }

    /// Longest placeholder whose token starts `rest`.
    fn match_prefix(rest: &str) -> Option<Placeholder> {
        Self::ALL
            .iter()
            .copied()
            .filter(|p| rest.starts_with(p.name()))
            .max_by_key(|p| p.name().len())
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Substitutes every recognized `%Token` in one left-to-right scan. Unknown
/// tokens are copied verbatim and substituted values are never rescanned.
pub fn render(template: &str, entry: &CatalogEntry) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        output.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match Placeholder::match_prefix(after) {
            Some(placeholder) => {
                output.push_str(&placeholder.display(entry));
                rest = &after[placeholder.name().len()..];
            }
            None => {
                output.push('%');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

#[derive(Debug, Clone)]
pub struct Notifier {
    template: String,
}

impl Notifier {
    pub fn new(template: &str) -> Self {
        let template = if template.trim().is_empty() {
            DEFAULT_NOTIFICATION_FORMAT
        } else {
            template
        };
        Self {
            template: template.to_string(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, entry: &CatalogEntry) -> String {
        render(&self.template, entry)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_FORMAT)
    }
}
