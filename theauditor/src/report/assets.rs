//! Static CSS/JS assets embedded in the binary and written alongside the
//! generated HTML report so the output directory is fully self-contained
//! (no CDN fetches, works offline).

/// Base stylesheet for the report shell (layout, tables, severity colors).
pub const STYLE_CSS: &str = r"
:root {
  --sev-critical: #b30000;
  --sev-high: #d9534f;
  --sev-medium: #e0a800;
  --sev-low: #5bc0de;
  --sev-info: #6c757d;
  --bg: #0f1115;
  --fg: #e6e6e6;
  --border: #2a2e35;
}
body { background: var(--bg); color: var(--fg); font-family: system-ui, sans-serif; margin: 0; }
header { padding: 1rem 1.5rem; border-bottom: 1px solid var(--border); }
main { padding: 1.5rem; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid var(--border); text-align: left; }
.badge { border-radius: 3px; padding: 0.1rem 0.4rem; font-size: 0.8rem; color: #fff; }
.badge.critical { background: var(--sev-critical); }
.badge.high { background: var(--sev-high); }
.badge.medium { background: var(--sev-medium); color: #111; }
.badge.low { background: var(--sev-low); color: #111; }
.badge.info { background: var(--sev-info); }
a { color: #8ab4f8; }
";

/// Minimal client-side chart rendering for the summary dashboard (severity
/// distribution bars). No external chart library — just canvas primitives.
pub const CHARTS_JS: &str = r"
(function () {
  function renderBars(canvasId, counts) {
    var canvas = document.getElementById(canvasId);
    if (!canvas) return;
    var ctx = canvas.getContext('2d');
    var keys = Object.keys(counts);
    var max = Math.max.apply(null, keys.map(function (k) { return counts[k]; }).concat([1]));
    var barWidth = canvas.width / keys.length;
    keys.forEach(function (k, i) {
      var h = (counts[k] / max) * (canvas.height - 20);
      ctx.fillRect(i * barWidth + 4, canvas.height - h, barWidth - 8, h);
    });
  }
  window.theauditorRenderBars = renderBars;
})();
";

/// Vendored PrismJS-style syntax highlighting stylesheet for code snippets.
pub const PRISM_CSS: &str = r"
code[class*='language-'], pre[class*='language-'] {
  color: #ccc; background: none; font-family: ui-monospace, monospace; font-size: 0.9em;
}
pre[class*='language-'] { padding: 0.75em; overflow: auto; background: #1d1f21; border-radius: 4px; }
.token.comment { color: #7c7c7c; }
.token.string { color: #a8ff60; }
.token.keyword { color: #ff80c0; }
.token.function { color: #8ab4f8; }
";

/// Minimal tokenizer driving the snippet highlighter above. Deliberately not
/// a full PrismJS vendor drop — just enough to color keywords/strings/comments.
pub const PRISM_JS: &str = r"
(function () {
  var RULES = [
    [/(#|\/\/).*$/gm, 'comment'],
    [/('([^'\\]|\\.)*'|\x22([^\x22\\]|\\.)*\x22)/g, 'string'],
    [/\b(def|class|if|else|elif|for|while|return|import|from|fn|let|pub|mod)\b/g, 'keyword'],
  ];
  function highlight(code) {
    var escaped = code.replace(/&/g, '&amp;').replace(/</g, '&lt;');
    RULES.forEach(function (rule) {
      escaped = escaped.replace(rule[0], function (m) {
        return '<span class=\x22token ' + rule[1] + '\x22>' + m + '</span>';
      });
    });
    return escaped;
  }
  document.querySelectorAll('code[class*=\x22language-\x22]').forEach(function (el) {
    el.innerHTML = highlight(el.textContent || '');
  });
})();
";
