//! HTML scoreboard report.
//!
//! Produces a single self-contained page listing every ranked emote with its
//! preview image, usage count, age, last use and score. Labels are German.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::ranking::RankedEmote;

/// Default base URL of emote preview images.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.7tv.app/emote";
/// Default base URL of emote detail pages.
pub const DEFAULT_EMOTE_PAGE_BASE: &str = "https://7tv.app/emotes";

const STYLE: &str = "* { font-family: Arial, Helvetica, sans-serif; padding: 0; margin: 0; box-sizing: border-box; } \
.main { display: flex; flex-direction: column; justify-content: center; align-items: center; padding: 30px; } \
.main > h2, .main > h4 { margin-bottom: 20px; } \
table { border-collapse: collapse; box-shadow: 0 0 20px rgba(0, 0, 0, 0.15); table-layout: auto !important; } \
th, td { border: 1px solid black; padding: 10px; } \
img { height: 30px; } \
td:nth-child(1) > div { display: flex; align-items: center; justify-content: center; } \
td:nth-child(2) > div { display: flex; align-items: center; } \
td:nth-child(2) > div > a { padding-left: 10px; } \
td:nth-child(3) { text-align: center; } \
tr:nth-of-type(even) { background-color: #c6c6c6; }";

const OPEN_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#000" d="M19 19H5V5h7V3H5a2 2 0 0 0-2 2v14a2 2 0 0 0 2 2h14c1.1 0 2-.9 2-2v-7h-2zM14 3v2h3.59l-9.83 9.83l1.41 1.41L19 6.41V10h2V3z"/></svg>"##;

/// Where the report points image and detail links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLinks {
    /// Images are loaded from `{cdn_base}/{id}/1x.avif`
    pub cdn_base: String,
    /// Names link to `{emote_page_base}/{id}`
    pub emote_page_base: String,
}

impl Default for ReportLinks {
    fn default() -> Self {
        Self {
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            emote_page_base: DEFAULT_EMOTE_PAGE_BASE.to_string(),
        }
    }
}

impl ReportLinks {
    fn image_url(&self, id: &str) -> String {
        format!("{}/{}/1x.avif", self.cdn_base.trim_end_matches('/'), id)
    }

    fn page_url(&self, id: &str) -> String {
        format!("{}/{}", self.emote_page_base.trim_end_matches('/'), id)
    }
}

/// Escape special HTML characters in a string.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whole days between `then` and `now`, truncated.
fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days()
}

fn format_last_used(last_used: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_used.map(|t| days_since(t, now)) {
        None => "Nie benutzt".to_string(),
        Some(0) => "Heute benutzt".to_string(),
        Some(days) => format!("{days} Tagen"),
    }
}

/// Render ranked rows with the default 7TV links.
pub fn render_report(rows: &[RankedEmote], generated_at: DateTime<Utc>) -> String {
    render_report_with(rows, generated_at, &ReportLinks::default())
}

/// Render ranked rows as a single-line HTML page.
///
/// Rows are emitted in the given order. `generated_at` is the date shown in
/// the heading and the reference point for every age column.
pub fn render_report_with(
    rows: &[RankedEmote],
    generated_at: DateTime<Utc>,
    links: &ReportLinks,
) -> String {
    let mut html = String::with_capacity(2048 + rows.len() * 512);

    html.push_str("<html><head><meta charset=\"utf-8\"><title>Emote Usage</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body><div class=\"main\"><h2>Emote Scoreboard</h2>");
    let _ = write!(html, "<h4>{}</h4>", generated_at.format("%d.%m.%Y"));
    html.push_str(
        "<table><tr><th>Emote</th><th>Name</th><th>Count</th>\
         <th>Hinzugefügt vor</th><th>Zuletzt benutzt</th><th>Score</th></tr>",
    );

    for row in rows {
        let id = escape_html(&row.id);
        let _ = write!(
            html,
            "<tr>\
             <td><div><img src=\"{image}\" alt=\"{name}\" loading=\"lazy\"></div></td>\
             <td><div>{name}<a href=\"{page}\">{icon}</a></div></td>\
             <td>{count}</td>\
             <td>{added} Tagen</td>\
             <td>{last_used}</td>\
             <td>{score:.6}</td>\
             </tr>",
            image = links.image_url(&id),
            page = links.page_url(&id),
            name = escape_html(&row.name),
            icon = OPEN_ICON,
            count = row.count,
            added = days_since(row.added_at, generated_at),
            last_used = format_last_used(row.last_used_at, generated_at),
            score = row.score,
        );
    }

    html.push_str("</table></div></body></html>");
    html.retain(|c| c != '\n');
    html
}

/// Write a rendered report, replacing any existing file.
pub async fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    info!(file = %path.display(), bytes = html.len(), "Wrote scoreboard report");
    Ok(())
}
