// crates/rc_report/src/html.rs
//
// Self-contained HTML pages (no external assets) from the display model.
// Templates are registered under `.html` names, so minijinja escapes every
// interpolated field.

use minijinja::{context, Environment};

use rc_pipeline::{RankingDoc, TableDoc};

use crate::{ranking_view, table_view, ReportError};

static TABLE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en"><meta charset="utf-8">
<title>{{ t.title }}</title>
<h1>{{ t.title }}{% if t.unit %} <small>({{ t.unit }})</small>{% endif %}</h1>
{% if t.cluster %}<p class="cluster">{{ t.cluster }}</p>{% endif %}
<p>Relation: {{ t.relation }}{% if t.comparison_year %}, compared with {{ t.comparison_year }}{% endif %}</p>
{% if t.relation_note %}<p class="note">{{ t.relation_note }}</p>{% endif %}
{% if t.legend %}<p class="legend">{{ t.legend }}</p>{% endif %}
<table>
<thead><tr><th>Rank</th><th>Country</th><th>Value</th><th>Δ prior</th><th>Δ prior %</th><th>Trend</th><th>Δ comparison</th><th>Year</th></tr></thead>
<tbody>
{% for r in t.rows %}<tr{% if r.highlighted %} class="home"{% elif r.is_group %} class="group"{% elif r.is_world %} class="world"{% endif %}><td>{{ r.rank }}</td><td>{{ r.country }}</td><td>{{ r.value }}</td><td>{{ r.delta_prior_abs }}</td><td>{{ r.delta_prior_pct }}</td><td>{{ r.trend }}</td><td>{{ r.delta_comparison }}</td><td>{{ r.latest_year }}</td></tr>
{% endfor %}</tbody>
</table>
{% if t.world %}
<h2>World</h2>
<ul>
{% for p in t.world %}<li>{{ p.year }}: {{ p.value }}</li>
{% endfor %}</ul>
{% endif %}
<footer>{{ t.id }}</footer>
</html>
"#;

static RANKING_TEMPLATE: &str = r#"<!doctype html>
<html lang="en"><meta charset="utf-8">
<title>Overall ranking</title>
<h1>Overall ranking</h1>
<p>{{ r.used|length }} of {{ r.eligible_count }} indicators used{% if r.below_coverage %}; {{ r.below_coverage }} countries below the coverage threshold{% endif %}</p>
<table>
<thead><tr><th>Rank</th><th>Country</th><th>Score</th><th>Coverage</th><th>Indicators</th></tr></thead>
<tbody>
{% for e in r.rows %}<tr{% if e.top and e.bottom %} class="top10 flop10"{% elif e.top %} class="top10"{% elif e.bottom %} class="flop10"{% endif %}><td>{{ e.rank }}</td><td>{{ e.country }}</td><td>{{ e.score }}</td><td>{{ e.coverage }}</td><td>{{ e.indicators_used }}</td></tr>
{% else %}<tr><td colspan="5">No countries meet the data coverage requirement.</td></tr>
{% endfor %}</tbody>
</table>
{% if r.missing %}
<h2>Missing indicators</h2>
<ul>
{% for m in r.missing %}<li>{{ m.title }}: {{ m.reason }}</li>
{% endfor %}</ul>
{% endif %}
<footer>{{ r.id }} · weights {{ r.weights_sha256 }}</footer>
</html>
"#;

fn render(name: &'static str, source: &'static str, ctx: minijinja::Value) -> Result<String, ReportError> {
    let mut env = Environment::new();
    env.add_template(name, source).map_err(|e| ReportError::Template(e.to_string()))?;
    let tmpl = env.get_template(name).map_err(|e| ReportError::Template(e.to_string()))?;
    tmpl.render(ctx).map_err(|e| ReportError::Template(e.to_string()))
}

pub fn render_table_html(doc: &TableDoc) -> Result<String, ReportError> {
    render("table.html", TABLE_TEMPLATE, context! { t => table_view(doc) })
}

pub fn render_ranking_html(doc: &RankingDoc) -> Result<String, ReportError> {
    render("ranking.html", RANKING_TEMPLATE, context! { r => ranking_view(doc) })
}
