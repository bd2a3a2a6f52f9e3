use axum::response::Html;
use reqmatch_core::{ComparisonResult, ComparisonRun};

const INDEX_HTML: &str = include_str!("../templates/index.html");
const RESULTS_HTML: &str = include_str!("../templates/results.html");
const ADMIN_HTML: &str = include_str!("../templates/admin_dashboard.html");

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

pub fn render_index() -> Html<String> {
    Html(INDEX_HTML.to_string())
}

/// Rows ordered by coverage, best first. Ties keep run order.
fn result_rows(results: &[ComparisonResult]) -> String {
    let mut ranked: Vec<&ComparisonResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage));

    if ranked.is_empty() {
        return "      <tr><td colspan=\"4\">No candidate documents.</td></tr>".to_string();
    }
    ranked
        .iter()
        .map(|r| {
            format!(
                "      <tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{:.2}</td></tr>",
                escape_html(&r.document_name),
                r.matched_count,
                r.total_requirements,
                r.match_percentage
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn skipped_list(run: &ComparisonRun) -> String {
    if run.skipped.is_empty() {
        return String::new();
    }
    let items: String = run
        .skipped
        .iter()
        .map(|s| {
            format!(
                "    <li>{}: {}</li>\n",
                escape_html(&s.filename),
                escape_html(&s.error)
            )
        })
        .collect();
    format!("  <h2>Skipped</h2>\n  <ul>\n{items}  </ul>")
}

/// Render the results page for a single comparison run.
pub fn render_results(run: &ComparisonRun) -> Html<String> {
    let html = RESULTS_HTML
        .replace("{{ reference }}", &escape_html(&run.reference))
        .replace("{{ rows }}", &result_rows(&run.results))
        .replace("{{ skipped }}", &skipped_list(run));
    Html(html)
}

/// Render the dashboard listing every saved run, newest first.
pub fn render_admin(history: &[ComparisonRun]) -> Html<String> {
    let runs = if history.is_empty() {
        "  <p>No comparisons have been saved yet.</p>".to_string()
    } else {
        history
            .iter()
            .rev()
            .map(|run| {
                format!(
                    "  <h2>{} <small>{}</small></h2>\n  <table>\n    <thead><tr><th>Document</th><th>Matched</th><th>Total</th><th>Match %</th></tr></thead>\n    <tbody>\n{}\n    </tbody>\n  </table>\n{}",
                    escape_html(&run.reference),
                    run.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    result_rows(&run.results),
                    skipped_list(run)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Html(ADMIN_HTML.replace("{{ runs }}", &runs))
}
