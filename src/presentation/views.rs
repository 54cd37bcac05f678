// HTML views - Page shells, tile chrome and tile bodies
use crate::domain::chart::{ChartPoint, ChartRange, ChartState};
use crate::domain::overview::Overview;
use crate::domain::sensor::SensorKind;
use crate::domain::session::User;
use crate::domain::tile::TileDescriptor;
use std::fmt::Write;

pub const LOADING: &str = "Loading...";
pub const OVERVIEW_LOAD_FAILED: &str = "Failed to load overview";
pub const NO_DATA: &str = "No data available";
pub const EMPTY_TILE: &str = "Empty tile";

const CHART_WIDTH: f64 = 380.0;
const CHART_HEIGHT: f64 = 260.0;
const CHART_PAD: f64 = 36.0;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f4f4f5; color: #18181b; }
header { display: flex; justify-content: space-between; align-items: center; padding: 0.75rem 1.5rem; background: #a3e635; }
header h1 { font-size: 1.1rem; letter-spacing: 0.05em; margin: 0; }
header form { display: inline; }
main { max-width: 2000px; margin: 1.5rem auto; padding: 0 1rem; }
.grid { display: grid; gap: 1.5rem; justify-content: center; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); }
.tile { position: relative; width: 420px; height: 420px; box-sizing: border-box; padding: 1rem; background: #fff; border: 1px solid #84cc16; border-radius: 0.75rem; display: flex; align-items: center; justify-content: center; }
.tile.drag-over { outline: 2px dashed #84cc16; }
.tile .handle { position: absolute; top: 0.5rem; left: 0.5rem; cursor: grab; color: #65a30d; }
.tile .remove { position: absolute; top: 0.5rem; right: 0.5rem; border: none; background: none; color: #65a30d; cursor: pointer; }
.tile-body { width: 100%; height: 100%; overflow: hidden; display: flex; flex-direction: column; align-items: center; justify-content: center; }
.add { width: 420px; height: 420px; border: 2px dashed #a3e635; border-radius: 0.75rem; background: none; color: #84cc16; font-size: 2.5rem; cursor: pointer; }
.muted { color: #a1a1aa; font-size: 0.875rem; }
.error { color: #ef4444; font-size: 0.875rem; text-align: center; }
.notice { color: #22c55e; font-size: 0.875rem; text-align: center; }
.overview { width: 100%; }
.overview h2, .chart-head h2 { color: #65a30d; font-size: 1.1rem; text-align: center; }
.overview .row { display: flex; justify-content: space-between; background: #f4f4f5; border-radius: 0.5rem; padding: 0.6rem 0.75rem; margin-bottom: 0.5rem; }
.overview .row strong { color: #65a30d; }
.overview .row.alarm strong { color: #ef4444; }
.chart-head { display: flex; justify-content: space-between; align-items: center; width: 100%; }
.ranges button { font-size: 0.75rem; border: none; border-radius: 0.375rem; padding: 0.25rem 0.5rem; background: #e4e4e7; cursor: pointer; }
.ranges button.active { background: #84cc16; }
.auth { max-width: 24rem; margin: 5rem auto; background: #fff; border-radius: 1rem; padding: 2rem; display: flex; flex-direction: column; gap: 0.9rem; }
.auth h1 { text-align: center; color: #84cc16; margin: 0; }
.auth input { padding: 0.5rem 1rem; border: 1px solid #d4d4d8; border-radius: 0.5rem; }
.auth button { padding: 0.5rem; border: none; border-radius: 0.5rem; background: #84cc16; color: #fff; cursor: pointer; }
.auth button.link { background: none; color: #84cc16; }
"#;

const SCRIPT: &str = r#"
function tileIdOf(el) { return el.closest('[data-tile-id]').dataset.tileId; }
function tileBody(id) {
  return Array.from(document.querySelectorAll('[data-tile-id]'))
    .find(tile => tile.dataset.tileId === id)?.querySelector('.tile-body');
}
function loadTile(id, range) {
  const body = tileBody(id);
  if (!body) return;
  body.innerHTML = '<span class="muted">Loading...</span>';
  const query = range ? '?range=' + encodeURIComponent(range) : '';
  fetch('/tiles/' + encodeURIComponent(id) + '/content' + query)
    .then(r => r.text())
    .then(html => { body.innerHTML = html; })
    .catch(() => { body.innerHTML = '<span class="error">Failed to load tile</span>'; });
}
function addTile() { fetch('/tiles', { method: 'POST' }).then(() => location.reload()); }
function removeTile(el) {
  fetch('/tiles/' + encodeURIComponent(tileIdOf(el)), { method: 'DELETE' }).then(() => location.reload());
}
function setRange(el, range) {
  const id = tileIdOf(el);
  fetch('/tiles/' + encodeURIComponent(id) + '/settings', {
    method: 'PATCH', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify({ range })
  }).then(() => loadTile(id));
}
function setKind(el, value) {
  if (!value) return;
  const id = tileIdOf(el);
  const kind = value === 'overview' ? { type: 'overview' } : { type: 'chart', sensor: value };
  fetch('/tiles/' + encodeURIComponent(id) + '/kind', {
    method: 'PUT', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(kind)
  }).then(() => location.reload());
}
document.addEventListener('DOMContentLoaded', () => {
  document.querySelectorAll('[data-tile-id]').forEach(tile => {
    const id = tile.dataset.tileId;
    loadTile(id);
    tile.addEventListener('dragstart', e => e.dataTransfer.setData('text/plain', id));
    tile.addEventListener('dragover', e => { e.preventDefault(); tile.classList.add('drag-over'); });
    tile.addEventListener('dragleave', () => tile.classList.remove('drag-over'));
    tile.addEventListener('drop', e => {
      e.preventDefault();
      tile.classList.remove('drag-over');
      const source = e.dataTransfer.getData('text/plain');
      if (!source || source === id) return;
      fetch('/tiles/reorder', {
        method: 'POST', headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ source, target: id })
      }).then(() => location.reload());
    });
  });
});
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, body: &str, script: bool) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{style}</style>
    {script}
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        script = if script {
            format!("<script>{}</script>", SCRIPT)
        } else {
            String::new()
        },
        body = body,
    )
}

pub fn loading_page() -> String {
    page(
        "Smart Terrarium",
        &format!(r#"<p class="muted" style="text-align:center;margin-top:2.5rem">{}</p>"#, LOADING),
        false,
    )
}

pub fn navbar(user: Option<&User>) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<span>{}</span>
        <form method="post" action="/logout"><button type="submit" title="Log out">Log out</button></form>"#,
            escape(&user.email)
        ),
        None => String::new(),
    };
    format!(
        r#"<header>
    <h1>SMART TERRARIUM</h1>
    <div>{}</div>
</header>"#,
        account
    )
}

pub fn dashboard_page(user: &User, tiles: &[TileDescriptor]) -> String {
    let mut grid = String::new();
    for tile in tiles {
        grid.push_str(&tile_chrome(tile));
    }
    let body = format!(
        r#"{nav}
<main>
    <div class="grid">
        {grid}
        <button class="add" onclick="addTile()" title="Add tile">+</button>
    </div>
</main>"#,
        nav = navbar(Some(user)),
        grid = grid,
    );
    page("Smart Terrarium", &body, true)
}

/// Drag handle, remove button and a body the script fills in
pub fn tile_chrome(tile: &TileDescriptor) -> String {
    let id = escape(&tile.id);
    format!(
        r#"<div class="tile" draggable="true" data-tile-id="{id}">
    <span class="handle" title="Drag to move">&#8942;&#8942;</span>
    <button class="remove" onclick="removeTile(this)" title="Remove tile">&#10005;</button>
    <div class="tile-body"><span class="muted">{loading}</span></div>
</div>"#,
        id = id,
        loading = LOADING,
    )
}

pub fn empty_tile_content() -> String {
    let mut options = String::from(r#"<option value="">Show…</option><option value="overview">Current values</option>"#);
    for kind in SensorKind::ALL {
        let _ = write!(
            options,
            r#"<option value="{}">{} chart</option>"#,
            kind.as_str(),
            kind.label()
        );
    }
    format!(
        r#"<span class="muted">{empty}</span>
<select onchange="setKind(this, this.value)">{options}</select>"#,
        empty = EMPTY_TILE,
        options = options,
    )
}

pub fn overview_content(overview: Option<&Overview>) -> String {
    let Some(overview) = overview else {
        return format!(r#"<div class="error">{}</div>"#, OVERVIEW_LOAD_FAILED);
    };

    let mut rows = String::new();
    for item in overview.items() {
        let _ = write!(
            rows,
            r#"<div class="row{alarm}"><span>{label}</span><strong>{value}</strong></div>"#,
            alarm = if item.alarm { " alarm" } else { "" },
            label = escape(item.label),
            value = escape(&item.value),
        );
    }
    format!(
        r#"<div class="overview">
    <h2>Current Values</h2>
    {rows}
    <p class="muted" style="text-align:center">Last update: {updated}</p>
</div>"#,
        rows = rows,
        updated = escape(&overview.latest_update_display()),
    )
}

pub fn sensor_color(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Temperature => "#f97316",
        SensorKind::Humidity => "#0ea5e9",
        SensorKind::WaterLevel => "#3b82f6",
        SensorKind::LightIntensity => "#eab308",
        SensorKind::Diodes => "#84cc16",
    }
}

/// Range buttons find their tile through the DOM, so ids never end up
/// inside inline script.
pub fn chart_content(sensor: SensorKind, state: &ChartState) -> String {
    let selected = state.range().unwrap_or_default();
    let mut buttons = String::new();
    for range in ChartRange::ALL {
        let _ = write!(
            buttons,
            r#"<button class="{class}" onclick="setRange(this, '{range}')">{label}</button>"#,
            class = if range == selected { "active" } else { "" },
            range = range.as_str(),
            label = range.label(),
        );
    }

    let body = match state {
        ChartState::Idle | ChartState::Loading { .. } => format!(r#"<span class="muted">{}</span>"#, LOADING),
        ChartState::Error { message, .. } => format!(r#"<span class="error">{}</span>"#, escape(message)),
        ChartState::Ready { points, .. } if points.is_empty() => {
            format!(r#"<span class="muted">{}</span>"#, NO_DATA)
        }
        ChartState::Ready { points, .. } => chart_svg(sensor.label(), points, sensor.unit(), sensor_color(sensor)),
    };

    format!(
        r#"<div class="chart-head"><h2>{title}</h2><div class="ranges">{buttons}</div></div>
{body}"#,
        title = escape(sensor.label()),
        buttons = buttons,
        body = body,
    )
}

/// Line chart with points spread evenly along x and a padded y domain
pub fn chart_svg(title: &str, points: &[ChartPoint], unit: &str, color: &str) -> String {
    let (mut lo, mut hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.value), hi.max(p.value)));
    if !lo.is_finite() || !hi.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let plot_w = CHART_WIDTH - CHART_PAD * 1.5;
    let plot_h = CHART_HEIGHT - CHART_PAD * 1.5;
    let step = if points.len() > 1 {
        plot_w / (points.len() - 1) as f64
    } else {
        0.0
    };

    let mut path = String::new();
    for (i, point) in points.iter().enumerate() {
        let x = CHART_PAD + step * i as f64;
        let y = CHART_PAD * 0.5 + (hi - point.value) / (hi - lo) * plot_h;
        if !path.is_empty() {
            path.push(' ');
        }
        let _ = write!(path, "{:.1},{:.1}", x, y);
    }

    let first = points.first().map(|p| p.date.as_str()).unwrap_or_default();
    let last = points.last().map(|p| p.date.as_str()).unwrap_or_default();
    let bottom = CHART_PAD * 0.5 + plot_h;

    format!(
        r##"<svg class="chart" viewBox="0 0 {w} {h}" width="100%" height="100%" role="img" aria-label="{title}">
    <line x1="{pad}" y1="{top}" x2="{pad}" y2="{bottom}" stroke="#555" stroke-opacity="0.3"/>
    <line x1="{pad}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="#555" stroke-opacity="0.3"/>
    <text x="2" y="{top_label}" font-size="10">{hi}{unit}</text>
    <text x="2" y="{bottom}" font-size="10">{lo}{unit}</text>
    <text x="{pad}" y="{h}" font-size="9">{first}</text>
    <text x="{right}" y="{h}" font-size="9" text-anchor="end">{last}</text>
    <polyline fill="none" stroke="{color}" stroke-width="2" points="{path}"/>
</svg>"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        title = escape(title),
        pad = CHART_PAD,
        top = CHART_PAD * 0.5,
        top_label = CHART_PAD * 0.5 + 4.0,
        bottom = bottom,
        right = CHART_PAD + plot_w,
        hi = format_tick(hi),
        lo = format_tick(lo),
        unit = escape(unit),
        first = escape(first),
        last = escape(last),
        color = color,
        path = path,
    )
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{}", rounded)
}

fn auth_page(title: &str, form: &str) -> String {
    page(title, &format!("{}\n{}", navbar(None), form), false)
}

fn messages(error: Option<&str>, notice: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        let _ = write!(out, r#"<p class="error">{}</p>"#, escape(error));
    }
    if let Some(notice) = notice.filter(|n| !n.is_empty()) {
        let _ = write!(out, r#"<p class="notice">{}</p>"#, escape(notice));
    }
    out
}

pub fn login_page(email: &str, error: Option<&str>, notice: Option<&str>) -> String {
    let form = format!(
        r#"<form class="auth" method="post" action="/login">
    <h1>Login</h1>
    <input type="email" name="email" placeholder="Email" value="{email}">
    <input type="password" name="password" placeholder="Password">
    {messages}
    <button type="submit">Sign In</button>
    <button type="submit" class="link" formaction="/login/reset">Forgot Password?</button>
    <p class="muted" style="text-align:center">Don't have an account? <a href="/register">Register</a></p>
</form>"#,
        email = escape(email),
        messages = messages(error, notice),
    );
    auth_page("Login", &form)
}

pub fn register_page(email: &str, error: Option<&str>) -> String {
    let form = format!(
        r#"<form class="auth" method="post" action="/register">
    <h1>Register</h1>
    <input type="email" name="email" placeholder="Email" value="{email}">
    <input type="password" name="password" placeholder="Password">
    <input type="password" name="confirm_password" placeholder="Confirm Password">
    {messages}
    <button type="submit">Create Account</button>
    <p class="muted" style="text-align:center">Already have an account? <a href="/login">Log in</a></p>
</form>"#,
        email = escape(email),
        messages = messages(error, None),
    );
    auth_page("Register", &form)
}
