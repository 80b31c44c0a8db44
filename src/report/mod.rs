/// Static HTML report rendering.
///
/// `render_report` is a pure function of the `ReportModel` and a label
/// table: no clock, no I/O, no map iteration. Rendering the same model
/// twice produces identical bytes. `write_report` is the only side effect.
///
/// Submodules:
/// - `labels`: per-language label tables.

pub mod labels;

pub use labels::{Labels, Language};

use crate::config::ColumnConfig;
use crate::model::{
    CurrentData, Forecast, ForecastDay, Observation, ReportModel, RunMode, StationOutcome,
    StationReport,
};
use chrono::Datelike;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const STYLESHEET: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
               min-height: 100vh; padding: 20px; color: #333; }
        .container { max-width: 1400px; margin: 0 auto; }
        header { background: white; padding: 30px; border-radius: 20px;
                 box-shadow: 0 10px 40px rgba(0,0,0,0.1); margin-bottom: 30px; text-align: center; }
        h1 { color: #667eea; font-size: 2.5em; margin-bottom: 10px; }
        .update-time { color: #666; font-size: 0.9em; margin-top: 10px; }
        .note { background: #fff3cd; padding: 15px; border-radius: 10px; margin-bottom: 20px;
                border-left: 4px solid #ffc107; }
        .tabs-container { background: white; border-radius: 15px; box-shadow: 0 5px 20px rgba(0,0,0,0.1); overflow: hidden; }
        .tabs-header { display: flex; background: #f8f9fa; border-bottom: 2px solid #dee2e6; }
        .tab-button { flex: 1; padding: 20px; background: none; border: none; cursor: pointer;
                      font-size: 1.2em; font-weight: 600; color: #666; }
        .tab-button:hover { background: rgba(102, 126, 234, 0.1); color: #667eea; }
        .tab-button.active { background: #667eea; color: white; }
        .tab-content { display: none; }
        .tab-content.active { display: block; }
        .park-card { background: white; padding: 25px; }
        .park-header { font-size: 1.5em; font-weight: 600; margin-bottom: 20px; padding-bottom: 15px;
                       border-bottom: 3px solid #667eea; }
        .data-row { display: flex; justify-content: space-between; padding: 12px 0; border-bottom: 1px solid #f0f0f0; }
        .data-label { color: #666; font-weight: 500; }
        .data-value { color: #333; font-weight: 600; }
        .stale { color: #856404; font-size: 0.85em; padding-top: 10px; }
        .no-data { color: #999; font-style: italic; text-align: center; padding: 20px; }
        .fetch-failed { color: #b00020; font-style: italic; text-align: center; padding: 20px; }
        .forecast { margin-top: 20px; }
        .forecast h3 { margin-bottom: 10px; }
        .forecast-day { background: #f8f9fa; border-radius: 12px; padding: 15px; margin-bottom: 10px;
                        border: 1px solid #dee2e6; }
        .forecast-day-header { font-weight: 600; margin-bottom: 10px; text-align: center; }
        .forecast-hours { display: grid; grid-template-columns: repeat(auto-fill, minmax(60px, 1fr)); gap: 8px; }
        .forecast-hour { background: white; padding: 8px 4px; border-radius: 6px; text-align: center;
                         border: 1px solid #e0e0e0; }
        .forecast-time { font-size: 0.7em; color: #666; }
        .forecast-value { font-size: 0.9em; font-weight: 700; color: #667eea; }
        .forecast-unit { font-size: 0.6em; color: #999; }
"#;

/// Shows one station panel at a time. The first panel is active in the
/// markup, so the page reads correctly without scripts.
const TAB_SCRIPT: &str = r#"
        function showTab(id) {
            document.querySelectorAll('.tab-content').forEach(function (el) {
                el.classList.toggle('active', el.id === id);
            });
            document.querySelectorAll('.tab-button').forEach(function (el) {
                el.classList.toggle('active', el.dataset.tab === id);
            });
        }
"#;

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The fields of a matched observation that are shown in the report:
/// everything except the timestamp column and the configured working
/// columns, in source order.
pub fn display_fields(observation: &Observation, columns: &ColumnConfig) -> Vec<(String, String)> {
    observation
        .fields
        .iter()
        .filter(|(name, _)| *name != columns.timestamp && !columns.hidden.contains(name))
        .cloned()
        .collect()
}

fn render_current(out: &mut String, current: Option<&CurrentData>, labels: &Labels) {
    let Some(current) = current else {
        let _ = writeln!(out, "<div class=\"no-data\">{}</div>", escape_html(labels.no_data));
        return;
    };

    for (label, time) in [
        (labels.requested_time, current.target),
        (labels.reference_date, current.observed_at),
    ] {
        let _ = writeln!(
            out,
            "<div class=\"data-row\"><span class=\"data-label\">{}:</span><span class=\"data-value\">{}</span></div>",
            escape_html(label),
            time.format("%Y-%m-%d %H:%M")
        );
    }
    for (name, value) in &current.fields {
        let _ = writeln!(
            out,
            "<div class=\"data-row\"><span class=\"data-label\">{}:</span><span class=\"data-value\">{}</span></div>",
            escape_html(name),
            escape_html(value)
        );
    }
    if current.stale {
        let _ = writeln!(out, "<div class=\"stale\">{}</div>", escape_html(labels.stale_note));
    }
}

fn render_day(out: &mut String, day: &ForecastDay, decimals: usize, labels: &Labels) {
    let _ = writeln!(
        out,
        "<div class=\"forecast-day\"><div class=\"forecast-day-header\">{} - {}</div><div class=\"forecast-hours\">",
        day.date.format("%d/%m/%Y"),
        escape_html(labels.weekday(day.date.weekday()))
    );
    for entry in &day.entries {
        let _ = writeln!(
            out,
            "<div class=\"forecast-hour\"><div class=\"forecast-time\">{}</div><div class=\"forecast-value\">{:.*}</div><div class=\"forecast-unit\">{}</div></div>",
            entry.timestamp.format("%H:%M"),
            decimals,
            entry.wind_speed,
            escape_html(labels.unit)
        );
    }
    out.push_str("</div></div>\n");
}

fn render_forecast(out: &mut String, forecast: &Forecast, horizon_days: u32, labels: &Labels) {
    let _ = writeln!(
        out,
        "<div class=\"forecast\"><h3>{}</h3>",
        escape_html(&labels.forecast_heading(horizon_days))
    );
    match forecast {
        Forecast::Unavailable => {
            let _ = writeln!(out, "<div class=\"no-data\">{}</div>", escape_html(labels.no_forecast));
        }
        Forecast::Days { method, days } => {
            for day in days {
                render_day(out, day, method.display_decimals(), labels);
            }
        }
    }
    out.push_str("</div>\n");
}

/// Panel id for the station at `index`; names are not used as ids since
/// they may contain any text.
fn tab_id(index: usize) -> String {
    format!("station-{}", index)
}

fn render_tab_buttons(out: &mut String, stations: &[StationReport]) {
    out.push_str("<div class=\"tabs-header\">\n");
    for (i, station) in stations.iter().enumerate() {
        let _ = writeln!(
            out,
            "<button class=\"tab-button{}\" data-tab=\"{}\" onclick=\"showTab('{}')\">⚡ {}</button>",
            if i == 0 { " active" } else { "" },
            tab_id(i),
            tab_id(i),
            escape_html(&station.station)
        );
    }
    out.push_str("</div>\n");
}

fn render_station(out: &mut String, index: usize, station: &StationReport, horizon_days: u32, labels: &Labels) {
    let _ = writeln!(
        out,
        "<div id=\"{}\" class=\"tab-content park-card{}\"><div class=\"park-header\">⚡ {}</div>",
        tab_id(index),
        if index == 0 { " active" } else { "" },
        escape_html(&station.station)
    );
    match &station.outcome {
        StationOutcome::FetchFailed { reason } => {
            let _ = writeln!(
                out,
                "<div class=\"fetch-failed\" title=\"{}\">{}</div>",
                escape_html(reason),
                escape_html(labels.fetch_failed)
            );
        }
        StationOutcome::Loaded { current, forecast } => {
            render_current(out, current.as_ref(), labels);
            render_forecast(out, forecast, horizon_days, labels);
        }
    }
    out.push_str("</div>\n");
}

/// Renders the full HTML document.
pub fn render_report(model: &ReportModel, labels: &Labels) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>{}</style>\n<script>{}</script>\n</head>\n<body>\n<div class=\"container\">\n",
        labels.html_lang,
        escape_html(labels.title),
        STYLESHEET,
        TAB_SCRIPT
    );
    let _ = writeln!(
        out,
        "<header><h1>🌬️ {}</h1><div class=\"update-time\">{}: {}</div></header>",
        escape_html(labels.title),
        escape_html(labels.last_updated),
        model.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    let note = match model.mode {
        RunMode::Historical => labels.historical_note,
        RunMode::Current | RunMode::Estimated => labels.current_note,
    };
    let _ = writeln!(out, "<div class=\"note\">📊 {}</div>", escape_html(note));

    out.push_str("<div class=\"tabs-container\">\n");
    render_tab_buttons(&mut out, &model.stations);
    for (i, station) in model.stations.iter().enumerate() {
        render_station(&mut out, i, station, model.horizon_days, labels);
    }
    out.push_str("</div>\n</div>\n</body>\n</html>\n");
    out
}

/// Writes the document, replacing any previous report at `path`.
pub fn write_report(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}
