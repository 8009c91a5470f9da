use crate::models::ActiveProfile;
use chrono::NaiveDate;

/// `today` is the server's day, so the entry form and the dashboard agree on it.
pub fn render_index(profile: &ActiveProfile, today: NaiveDate, config_error: Option<&str>) -> String {
    let name = if profile.name.is_empty() {
        "–".to_string()
    } else {
        escape_html(&profile.name)
    };
    let goal = if profile.goal > 0 {
        profile.goal.to_string()
    } else {
        "–".to_string()
    };
    INDEX_HTML
        .replace("{{PROFILE}}", &name)
        .replace("{{GOAL}}", &goal)
        .replace("{{TODAY}}", &today.format("%Y-%m-%d").to_string())
        .replace("{{CONFIG_ERROR}}", &escape_html(config_error.unwrap_or_default()))
        .replace(
            "{{CONFIGURED}}",
            if config_error.is_some() { "false" } else { "true" },
        )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Pushup Log</title>
  <style>
    :root {
      --bg: #14161f;
      --card: #1d2030;
      --ink: #e8e9f3;
      --muted: #a0a4c0;
      --accent: #4f8cff;
      --accent-soft: rgba(79, 140, 255, 0.25);
      --warm: #ff9f43;
      --danger: #e5484d;
      --ok: #30a46c;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #232842, var(--bg) 65%);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      justify-items: center;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(880px, 100%);
      display: grid;
      gap: 20px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 4vw, 2.2rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(255, 255, 255, 0.05);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      color: var(--muted);
      box-shadow: none;
      padding: 8px 16px;
    }

    .tab.active {
      background: var(--accent);
      color: white;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(255, 255, 255, 0.05);
      display: grid;
      gap: 14px;
    }

    .card h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 14px;
    }

    .stat .label {
      display: block;
      font-size: 0.78rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 600;
    }

    .progress {
      height: 10px;
      background: rgba(255, 255, 255, 0.08);
      border-radius: 999px;
      overflow: hidden;
    }

    .progress-inner {
      height: 100%;
      width: 0;
      background: linear-gradient(90deg, var(--accent), var(--warm));
      transition: width 300ms ease;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input {
      background: rgba(255, 255, 255, 0.06);
      border: 1px solid rgba(255, 255, 255, 0.1);
      color: var(--ink);
      border-radius: 12px;
      padding: 10px 12px;
      font-size: 1rem;
      min-width: 0;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button:disabled,
    input:disabled {
      opacity: 0.45;
      cursor: not-allowed;
    }

    .btn-quiet {
      background: rgba(255, 255, 255, 0.08);
    }

    .btn-danger {
      background: var(--danger);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-bar {
      fill: var(--accent-soft);
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2.5;
    }

    .chart-forecast {
      fill: none;
      stroke: var(--warm);
      stroke-width: 2;
      stroke-dasharray: 5 5;
    }

    .chart-grid {
      stroke: rgba(255, 255, 255, 0.06);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 10px;
    }

    .entries {
      display: grid;
      gap: 8px;
    }

    .entry-row {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 10px;
      padding: 10px 12px;
      background: rgba(255, 255, 255, 0.03);
      border-radius: 12px;
    }

    .entry-actions {
      display: flex;
      gap: 6px;
    }

    .zero-days {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .chip {
      padding: 4px 10px;
      border-radius: 999px;
      background: rgba(229, 72, 77, 0.18);
      font-size: 0.8rem;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.92rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    .status[data-type="ok"] {
      color: var(--ok);
    }

    .footnote {
      color: var(--muted);
      font-size: 0.88rem;
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Pushup Log</h1>
        <p class="subtitle">Profile <strong id="profile-name">{{PROFILE}}</strong> · goal <span id="goal-label">{{GOAL}}</span></p>
      </div>
      <nav class="tabs">
        <button class="tab active" type="button" data-view="dashboard">Dashboard</button>
        <button class="tab" type="button" data-view="settings">Settings</button>
      </nav>
    </header>

    <div class="status" id="config-error" data-type="error">{{CONFIG_ERROR}}</div>

    <section id="dashboard-view">
      <div class="card">
        <div class="stats">
          <div class="stat"><span class="label">This year</span><span class="value" id="total">0</span></div>
          <div class="stat"><span class="label">Today</span><span class="value" id="today-total">0</span></div>
          <div class="stat"><span class="label">Current streak</span><span class="value" id="streak-current">0</span></div>
          <div class="stat"><span class="label">Best streak</span><span class="value" id="streak-best">0</span></div>
        </div>
        <div class="progress"><div class="progress-inner" id="progress-inner"></div></div>
        <div class="footnote" id="goal-text">–</div>
      </div>

      <div class="card">
        <h2>Projection</h2>
        <div class="stats">
          <div class="stat"><span class="label">Average per day</span><span class="value" id="average">–</span></div>
          <div class="stat"><span class="label">Days left</span><span class="value" id="days-remaining">–</span></div>
          <div class="stat"><span class="label">Goal reached</span><span class="value" id="eta">–</span></div>
        </div>
      </div>

      <div class="card">
        <h2>Log pushups</h2>
        <form id="entry-form">
          <input id="count-input" type="number" min="1" step="1" placeholder="Count" required />
          <input id="date-input" type="date" value="{{TODAY}}" required />
          <button type="submit">Save</button>
        </form>
        <div class="status" id="entry-status"></div>
      </div>

      <div class="card">
        <h2>Trend</h2>
        <svg id="chart" viewBox="0 0 600 260" aria-label="Daily totals and 7-day average" role="img"></svg>
        <div class="footnote">Bars are daily totals, the line is the 7-day average, the dashed tail is a forecast.</div>
      </div>

      <div class="card">
        <h2>Missed days</h2>
        <div class="zero-days" id="zero-days"></div>
      </div>

      <div class="card">
        <h2>History</h2>
        <div class="status" id="history-status"></div>
        <div class="entries" id="entries"></div>
      </div>
    </section>

    <section id="settings-view" hidden>
      <div class="card">
        <h2>Switch profile</h2>
        <form id="lookup-form">
          <input id="lookup-input" placeholder="Profile name" required />
          <button type="submit">Switch</button>
        </form>
        <div class="status" id="lookup-status"></div>
      </div>

      <div class="card">
        <h2>Create profile</h2>
        <form id="create-form">
          <input id="create-name" placeholder="Name" required />
          <input id="create-goal" type="number" min="1" step="1" placeholder="Yearly goal" required />
          <button type="submit">Create</button>
        </form>
        <div class="status" id="create-status"></div>
      </div>

      <div class="card">
        <h2>Update goal</h2>
        <form id="goal-form">
          <input id="goal-input" type="number" min="1" step="1" placeholder="New goal" required />
          <button type="submit">Update</button>
        </form>
        <div class="status" id="goal-status"></div>
      </div>
    </section>
  </main>

  <script>
    const configured = {{CONFIGURED}};
    const $ = (id) => document.getElementById(id);
    const chartEl = $('chart');

    let active = null;
    let seededDate = $('date-input').value;

    const setStatus = (id, message, type) => {
      const el = $(id);
      el.textContent = message;
      el.dataset.type = type || '';
    };

    const formatNumber = (value) => Number(value).toLocaleString();
    const formatTenth = (value) => (Math.round(value * 10) / 10).toFixed(1);

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        headers: { 'content-type': 'application/json' },
        ...options
      });
      if (!res.ok) {
        const message = await res.text();
        throw new Error(message || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const setView = (view) => {
      document.querySelectorAll('[data-view]').forEach((button) => {
        button.classList.toggle('active', button.dataset.view === view);
      });
      $('dashboard-view').hidden = view !== 'dashboard';
      $('settings-view').hidden = view !== 'settings';
    };

    const setFormsEnabled = (enabled) => {
      document.querySelectorAll('form input, form button').forEach((el) => {
        el.disabled = !enabled;
      });
    };

    const renderProfile = (profile) => {
      active = profile;
      $('profile-name').textContent = profile.name || '–';
      $('goal-label').textContent = profile.goal > 0 ? formatNumber(profile.goal) : '–';
      $('lookup-input').value = profile.name || '';
      $('goal-input').value = profile.goal > 0 ? profile.goal : '';
      $('goal-form').querySelectorAll('input, button').forEach((el) => {
        el.disabled = !configured || !profile.id;
      });
      setStatus('goal-status', profile.id ? '' : 'Switch to a saved profile to change its goal.', '');
    };

    const renderChart = (points) => {
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const padX = 40;
      const padY = 30;
      const top = 16;
      const max = Math.max(1, ...points.map((point) => Math.max(point.total, point.average)));
      const step = (width - padX * 2) / Math.max(1, points.length - 1);
      const x = (index) => padX + index * step;
      const y = (value) => height - padY - (value / max) * (height - padY - top);
      const barWidth = Math.max(2, Math.min(18, step * 0.6));

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = (max * i) / 4;
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(value)}" x2="${width - padX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${padX - 8}" y="${y(value) + 3}" text-anchor="end">${Math.round(value)}</text>`;
      }

      const bars = points
        .filter((point) => !point.forecast)
        .map((point, index) => `<rect class="chart-bar" x="${x(index) - barWidth / 2}" y="${y(point.total)}" width="${barWidth}" height="${y(0) - y(point.total)}" />`)
        .join('');

      const real = points.filter((point) => !point.forecast);
      const line = real
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(1)} ${y(point.average).toFixed(1)}`)
        .join(' ');

      let forecast = '';
      const last = points[points.length - 1];
      if (last.forecast && real.length) {
        const from = real.length - 1;
        forecast = `<path class="chart-forecast" d="M ${x(from)} ${y(real[from].average)} L ${x(from + 1)} ${y(last.average)}" />`;
      }

      const labelEvery = Math.ceil(points.length / 8);
      const labels = points
        .map((point, index) => index % labelEvery === 0
          ? `<text class="chart-label" x="${x(index)}" y="${height - padY + 16}" text-anchor="middle">${point.date.slice(5).replace('-', '/')}</text>`
          : '')
        .join('');

      chartEl.innerHTML = `${grid}${bars}<path class="chart-line" d="${line}" />${forecast}${labels}`;
    };

    const renderDashboard = (dashboard) => {
      const stats = dashboard.analytics;
      renderProfile(dashboard.profile);
      if ($('date-input').value === seededDate) {
        $('date-input').value = dashboard.today;
      }
      seededDate = dashboard.today;
      $('total').textContent = formatNumber(stats.total);
      $('today-total').textContent = formatNumber(stats.today_total);
      $('streak-current').textContent = stats.streak.current;
      $('streak-best').textContent = stats.streak.best;
      $('progress-inner').style.width = `${stats.progress_percent}%`;
      $('goal-text').textContent = stats.goal > 0
        ? `${formatNumber(stats.total)} of ${formatNumber(stats.goal)} (${formatTenth(stats.progress_percent)} %), ${formatNumber(stats.remaining)} to go`
        : 'No goal set for this profile.';

      const projection = stats.projection;
      $('average').textContent = projection ? formatTenth(projection.average_per_day) : '–';
      $('days-remaining').textContent = projection ? projection.days_remaining : '–';
      $('eta').textContent = projection ? projection.estimated_date : '–';

      $('zero-days').innerHTML = stats.zero_days.length
        ? stats.zero_days.map((day) => `<span class="chip">${day}</span>`).join('')
        : '<span class="footnote">No missed days. Keep going!</span>';

      renderChart(stats.rolling);
    };

    const renderEntries = (entries) => {
      const container = $('entries');
      if (!entries.length) {
        container.innerHTML = '<div class="footnote">No sessions logged yet.</div>';
        return;
      }
      container.innerHTML = '';
      entries.forEach((entry) => {
        const row = document.createElement('div');
        row.className = 'entry-row';
        row.innerHTML = `
          <div><strong class="entry-date"></strong> · <span class="entry-count"></span></div>
          <div class="entry-actions">
            <button type="button" class="btn-quiet" data-action="edit">Edit</button>
            <button type="button" class="btn-danger" data-action="delete">Delete</button>
          </div>`;
        row.querySelector('.entry-date').textContent = entry.date || '?';
        row.querySelector('.entry-count').textContent = `${entry.count} reps`;
        row.querySelector('[data-action="edit"]').addEventListener('click', () => {
          editEntry(entry).catch(report('history-status'));
        });
        row.querySelector('[data-action="delete"]').addEventListener('click', () => {
          deleteEntry(entry).catch(report('history-status'));
        });
        row.querySelectorAll('button').forEach((button) => {
          button.disabled = !configured;
        });
        container.appendChild(row);
      });
    };

    const refresh = async () => {
      if (!configured) {
        return;
      }
      const [dashboard, entries] = await Promise.all([api('/api/dashboard'), api('/api/entries')]);
      renderDashboard(dashboard);
      renderEntries(entries);
    };

    const report = (id) => (err) => setStatus(id, err.message, 'error');

    const editEntry = async (entry) => {
      const count = window.prompt('New count:', String(entry.count));
      if (count === null) {
        return;
      }
      const date = window.prompt('New date (YYYY-MM-DD):', entry.date || '');
      if (date === null) {
        return;
      }
      await api(`/api/entries/${encodeURIComponent(entry.id)}`, {
        method: 'PUT',
        body: JSON.stringify({ count, date })
      });
      setStatus('history-status', 'Session updated.', 'ok');
      await refresh();
    };

    const deleteEntry = async (entry) => {
      if (!window.confirm('Delete this session?')) {
        return;
      }
      await api(`/api/entries/${encodeURIComponent(entry.id)}`, { method: 'DELETE' });
      setStatus('history-status', 'Session deleted.', 'ok');
      await refresh();
    };

    $('entry-form').addEventListener('submit', (event) => {
      event.preventDefault();
      setStatus('entry-status', 'Saving...', '');
      api('/api/entries', {
        method: 'POST',
        body: JSON.stringify({ count: $('count-input').value, date: $('date-input').value })
      })
        .then(() => {
          $('count-input').value = '';
          setStatus('entry-status', 'Saved', 'ok');
          return refresh();
        })
        .catch(report('entry-status'));
    });

    $('lookup-form').addEventListener('submit', (event) => {
      event.preventDefault();
      api('/api/profiles/active', {
        method: 'POST',
        body: JSON.stringify({ name: $('lookup-input').value })
      })
        .then((profile) => {
          setStatus('lookup-status', `Switched to ${profile.name}.`, 'ok');
          return refresh();
        })
        .catch(report('lookup-status'));
    });

    $('create-form').addEventListener('submit', (event) => {
      event.preventDefault();
      api('/api/profiles', {
        method: 'POST',
        body: JSON.stringify({ name: $('create-name').value, goal: $('create-goal').value })
      })
        .then((profile) => {
          $('create-form').reset();
          setStatus('create-status', `Created ${profile.name}.`, 'ok');
          return refresh();
        })
        .catch(report('create-status'));
    });

    $('goal-form').addEventListener('submit', (event) => {
      event.preventDefault();
      if (!active || !active.id) {
        return;
      }
      api(`/api/profiles/${encodeURIComponent(active.id)}`, {
        method: 'PUT',
        body: JSON.stringify({ goal: $('goal-input').value })
      })
        .then(() => {
          setStatus('goal-status', 'Goal updated.', 'ok');
          return refresh();
        })
        .catch(report('goal-status'));
    });

    document.querySelectorAll('[data-view]').forEach((button) => {
      button.addEventListener('click', () => setView(button.dataset.view));
    });

    setView('dashboard');

    if (!configured) {
      setFormsEnabled(false);
    } else {
      refresh().catch(report('entry-status'));
    }
  </script>
</body>
</html>
"#;
