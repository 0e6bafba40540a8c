//! HTML fragments for the status pages.
//!
//! Plain markup: one document, a navigation list, the cached
//! sensor summary, an optional table or list, and the graph data array the
//! client-side chart reads.  Styling and the chart script are not rendered
//! here.

use core::fmt::Write as _;
use core::time::Duration;

use crate::app::journal::NotificationEntry;
use crate::app::state::GraphSeries;
use crate::reading::Reading;

pub const SITE_TITLE: &str = "Efficient Greenhouse Plant Care system";

/// Status line and head for every response.
pub const RESPONSE_HEAD: &str = "HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n";

const NAVIGATION: &str = "<ul role=\"menu\">\
<li><strong>Page Navigation:</strong></li>\
<li><a role=\"menuitem\" href='/'>Go to Home Page</a></li>\
<li><a role=\"menuitem\" href='/relay1/on'>Test Relay One</a></li>\
<li><a role=\"menuitem\" href='/relay2/on'>Test Relay Two</a></li>\
<li><a role=\"menuitem\" href='/logs/list'>List Recently Logged data</a></li>\
<li><a role=\"menuitem\" href='/logs/monitor'>Check Notification Activity</a></li>\
</ul>";

const TABLE_HEADER: &str = "<tr><th>Time (UTC)</th><th>Date</th><th>Soil dryness, %</th>\
<th>Light levels, %</th><th>Temperature</th><th>Relative Humidity, %</th></tr>";

/// Per-page content around the shared layout.
#[derive(Debug, Default)]
pub struct Page<'a> {
    pub title: &'a str,
    /// Bold status line (already HTML).
    pub status: &'a str,
    /// Main block, e.g. the history table (already HTML).
    pub content: &'a str,
    /// Trailing block, e.g. the notification list (already HTML).
    pub notices: &'a str,
}

/// The cached "Sensor Data" list items for one reading.
pub fn summary_fragment(r: &Reading) -> String {
    format!(
        "<li> Time reported at: {} (UTC)</li>\
         <li> Date reported at: {} (D/M/Y) </li>\
         <li> Soil dryness: {}%</li>\
         <li> Light levels: {}%</li>\
         <li> Temperature: {} C</li>\
         <li> Relative humidity: {}%</li>",
        escape(&r.time),
        escape(&r.date),
        r.soil_pct,
        r.light_pct,
        r.temperature_c,
        r.humidity_pct,
    )
}

pub fn page(page: &Page<'_>, summary: &str, graph: &GraphSeries) -> String {
    let mut out = String::with_capacity(2048 + page.content.len() + page.notices.len());
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\
         <title>{title} - {SITE_TITLE}</title>\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
         </head>\n<body>\n<h1>{SITE_TITLE}</h1>\n{NAVIGATION}\n<br>\n\
         <ul><li><strong>Sensor Data:</strong></li>{summary}</ul>\n\
         <p><strong>{status}</strong></p>\n\
         <div class=\"PlainData\">{content}</div>\n\
         {notices}\n<br>\n\
         <script>\nlet data =\n{data};\n</script>\n\
         </body>\n</html>\n",
        title = escape(page.title),
        status = page.status,
        content = page.content,
        notices = page.notices,
        data = graph_data(graph),
    );
    out
}

/// History as table rows under the fixed column header.
pub fn history_table<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> String {
    let mut out = String::from("<table>");
    out.push_str(TABLE_HEADER);
    for r in readings {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&r.time),
            escape(&r.date),
            r.soil_pct,
            r.light_pct,
            r.temperature_c,
            r.humidity_pct,
        );
    }
    out.push_str("</table>");
    out
}

pub fn notification_list<'a>(entries: impl IntoIterator<Item = &'a NotificationEntry>) -> String {
    let mut out = String::new();
    for e in entries {
        let _ = write!(out, "<li>{}</li>", escape(&e.to_string()));
    }
    out
}

/// Client-side reload after `after`.
pub fn refresh_script(after: Duration) -> String {
    format!(
        "<script>setTimeout(() => {{document.location.reload();}},{});</script>",
        after.as_millis()
    )
}

/// `[[axis…],[soil…],[light…],[temperature…],[humidity…]]`
pub fn graph_data(g: &GraphSeries) -> String {
    let mut out = String::from("[");
    push_array(&mut out, &g.axis);
    for column in [&g.soil, &g.light, &g.temperature, &g.humidity] {
        out.push(',');
        push_array(&mut out, column);
    }
    out.push(']');
    out
}

fn push_array<T: core::fmt::Display>(out: &mut String, items: &[T]) {
    out.push('[');
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{v}");
    }
    out.push(']');
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
