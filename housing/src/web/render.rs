//! HTML rendering for the web pages.

use crate::core::Experiment;
use crate::data::NUMERIC_COLUMNS;
use crate::predictor::HousingData;
use std::fmt::Write as _;

/// Choices offered for `ocean_proximity`.
const OCEAN_PROXIMITY_CHOICES: [&str; 5] = ["<1H OCEAN", "INLAND", "ISLAND", "NEAR BAY", "NEAR OCEAN"];

/// Escapes text for inclusion in HTML content or attribute values.
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats a value as dollars with comma grouping and two decimals,
/// e.g. `$452,600.00`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<nav><a href=\"/\">Predict</a> | <a href=\"/retrain\">Retrain</a></nav>\n{body}</body>\n</html>\n",
        title = html_escape(title),
    )
}

/// The input form, pre-filled with `values` when given.
#[must_use]
pub fn form_page(values: Option<&HousingData>) -> String {
    page("Housing price prediction", &form(values))
}

fn form(values: Option<&HousingData>) -> String {
    let numeric = values.map(HousingData::numeric_values);
    let mut html = String::from("<h1>Housing price prediction</h1>\n<form method=\"post\" action=\"/\">\n");
    for (i, name) in NUMERIC_COLUMNS.iter().enumerate() {
        let value = numeric.map(|v| v[i].to_string()).unwrap_or_default();
        let _ = writeln!(
            html,
            "<label>{name} <input name=\"{name}\" value=\"{}\" required></label><br>",
            html_escape(&value)
        );
    }

    html.push_str("<label>ocean_proximity <select name=\"ocean_proximity\">");
    let selected = values.map(|v| v.ocean_proximity.as_str());
    for choice in OCEAN_PROXIMITY_CHOICES {
        let attr = if selected == Some(choice) { " selected" } else { "" };
        let escaped = html_escape(choice);
        let _ = write!(html, "<option value=\"{escaped}\"{attr}>{escaped}</option>");
    }
    html.push_str("</select></label><br>\n<button type=\"submit\">Predict</button>\n</form>\n");
    html
}

/// The result page: echoed inputs and the formatted prediction.
#[must_use]
pub fn prediction_page(data: &HousingData, value: f64) -> String {
    let mut body = String::from("<h1>Prediction</h1>\n<table>\n");
    for (name, field) in data.fields() {
        let _ = writeln!(body, "<tr><th>{name}</th><td>{}</td></tr>", html_escape(&field));
    }
    body.push_str("</table>\n");
    let _ = writeln!(
        body,
        "<p>Predicted median house value:</p>\n<p class=\"prediction\">{}</p>",
        format_currency(value)
    );
    body.push_str(&form(Some(data)));
    page("Prediction", &body)
}

/// An error page carrying `message`.
#[must_use]
pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &format!("<h1>Error</h1>\n<p class=\"error\">{}</p>\n", html_escape(message)),
    )
}

/// The retraining page: an optional notice, the current record and a
/// trigger button.
#[must_use]
pub fn retrain_page(experiment: &Experiment, notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Model retraining</h1>\n");
    if let Some(notice) = notice {
        let _ = writeln!(body, "<p class=\"notice\">{}</p>", html_escape(notice));
    }

    let status = if experiment.is_running() { "running" } else { "idle" };
    let _ = writeln!(body, "<p>Status: <strong>{status}</strong></p>\n<table>");
    let rows = [
        (
            "Experiment",
            experiment.experiment_id.map(|id| id.to_string()).unwrap_or_default(),
        ),
        (
            "Artifacts",
            experiment.artifact_time_stamp.clone().unwrap_or_default(),
        ),
        (
            "Started",
            experiment.start_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (
            "Stopped",
            experiment.stop_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (
            "Duration (s)",
            experiment
                .execution_time
                .map(|s| format!("{s:.1}"))
                .unwrap_or_default(),
        ),
        (
            "Outcome",
            experiment.outcome.map(|o| o.to_string()).unwrap_or_default(),
        ),
        (
            "Model accuracy",
            experiment
                .model_accuracy
                .map(|a| format!("{a:.4}"))
                .unwrap_or_default(),
        ),
        ("Message", experiment.message.clone()),
    ];
    for (label, value) in rows {
        let _ = writeln!(body, "<tr><th>{label}</th><td>{}</td></tr>", html_escape(&value));
    }
    body.push_str(
        "</table>\n<form method=\"post\" action=\"/retrain\"><button type=\"submit\">Retrain</button></form>\n",
    );
    page("Model retraining", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(452_600.0), "$452,600.00");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1_500.0), "-$1,500.00");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<1H OCEAN> & \"quotes\" 'x'"),
            "&lt;1H OCEAN&gt; &amp; &quot;quotes&quot; &#39;x&#39;"
        );
    }

    #[test]
    fn test_form_page_escapes_choices() {
        let html = form_page(None);
        assert!(html.contains("&lt;1H OCEAN"));
        assert!(!html.contains("<1H OCEAN"));
        for name in NUMERIC_COLUMNS {
            assert!(html.contains(&format!("name=\"{name}\"")));
        }
    }

    #[test]
    fn test_retrain_page_shows_state() {
        let html = retrain_page(&Experiment::started("20240101000000"), Some("started"));
        assert!(html.contains("<strong>running</strong>"));
        assert!(html.contains("20240101000000"));
        assert!(html.contains("<p class=\"notice\">started</p>"));
    }
}
