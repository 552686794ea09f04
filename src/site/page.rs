use crate::config::HtmlConfig;

pub const CHARTS_FILE: &str = "charts.json";

const HIGHCHARTS_SCRIPTS: [&str; 4] = [
    "https://code.highcharts.com/highcharts.js",
    "https://code.highcharts.com/modules/heatmap.js",
    "https://code.highcharts.com/modules/histogram-bellcurve.js",
    "https://code.highcharts.com/modules/accessibility.js",
];

const DASHBOARD_SCRIPT: &str = r#"
fetch("charts.json")
  .then((response) => {
    if (!response.ok) throw new Error(response.status + " " + response.statusText);
    return response.json();
  })
  .then((charts) => {
    const container = document.getElementById("charts");
    for (const chart of charts) {
      const element = document.createElement("section");
      element.id = chart.id;
      element.className = "chart chart-" + chart.kind;
      container.appendChild(element);
      Highcharts.chart(element, chart.options);
    }
  })
  .catch((error) => {
    const message = document.getElementById("error");
    message.textContent = "Couldn't load the dashboard: " + error.message;
    message.hidden = false;
  });
"#;

/// Escapes text for use in element content and double quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The dashboard page. Charts are drawn in the browser from [CHARTS_FILE].
pub fn render_index(html: &HtmlConfig) -> String {
    let title = escape_html(&html.title);
    let description = escape_html(&html.description);

    let mut head = vec![
        r#"<meta charset="utf-8">"#.to_string(),
        r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#.to_string(),
        format!("<title>{title}</title>"),
        format!(r#"<meta name="description" content="{description}">"#),
    ];
    head.extend(html.meta.iter().map(|v| {
        format!(
            r#"<meta name="{}" content="{}">"#,
            escape_html(&v.name),
            escape_html(&v.content)
        )
    }));
    head.extend(
        HIGHCHARTS_SCRIPTS
            .iter()
            .map(|v| format!(r#"<script src="{v}"></script>"#)),
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  {head}
</head>
<body>
  <header>
    <h1>{title}</h1>
    <p>{description}</p>
  </header>
  <p id="error" role="alert" hidden></p>
  <main id="charts"></main>
  <script>{DASHBOARD_SCRIPT}</script>
</body>
</html>
"#,
        head = head.join("\n  "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MetaTag};

    #[test]
    fn escape_html_special_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Aura Log"), "Aura Log");
    }

    #[test]
    fn render_index_uses_html_config() {
        let mut html = Config::default().html;
        html.title = "Headaches <2023>".into();
        html.meta.push(MetaTag {
            name: "theme-color".into(),
            content: "#861386".into(),
        });

        let page = render_index(&html);

        assert!(page.contains("<title>Headaches &lt;2023&gt;</title>"));
        assert!(page.contains(r#"<meta name="description" content="My migraine log and dashboard.">"#));
        assert!(page.contains(r##"<meta name="theme-color" content="#861386">"##));
        assert!(page.contains("highcharts.js"));
        assert!(page.contains(r#"fetch("charts.json")"#));
        assert!(page.contains("Couldn't load the dashboard"));
    }
}
