//! HTML templates for the operator dashboard.

/// Escape text for interpolation into HTML.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Base HTML template shared by all dashboard pages.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Terrascope</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }}
        h1, h2 {{ font-weight: 600; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ text-align: left; padding: 0.4rem 0.8rem; border-bottom: 1px solid #ddd; }}
        textarea {{ width: 100%; min-height: 24rem; font-family: monospace; }}
        .error {{ color: #b00020; }}
        .muted {{ color: #777; }}
        form.inline {{ display: inline; }}
    </style>
</head>
<body>
    <header>
        <nav><a href="/">Terrascope</a></nav>
    </header>
    <main>
{}
    </main>
</body>
</html>"#,
        html_escape(title),
        content
    )
}

/// Dashboard page: configured tables with their views, plus unconfigured
/// candidates.
pub fn dashboard_page(configured: &[(String, String)], unconfigured: &[String]) -> String {
    let mut content = String::from("<h1>Dashboard tables</h1>\n");

    if configured.is_empty() {
        content.push_str("<p class=\"muted\">No tables configured yet.</p>\n");
    } else {
        content.push_str("<table>\n<tr><th>Table</th><th>Views</th><th></th></tr>\n");
        for (table, views) in configured {
            content.push_str(&format!(
                "<tr><td><a href=\"/config/{t}\">{t}</a></td><td>{v}</td>\
                 <td><form class=\"inline\" method=\"post\" action=\"/config/{t}/delete\">\
                 <button type=\"submit\">remove</button></form></td></tr>\n",
                t = html_escape(table),
                v = html_escape(views),
            ));
        }
        content.push_str("</table>\n");
    }

    content.push_str("<h2>Unconfigured tables</h2>\n");
    if unconfigured.is_empty() {
        content.push_str("<p class=\"muted\">None.</p>\n");
    } else {
        content.push_str("<ul>\n");
        for table in unconfigured {
            content.push_str(&format!(
                "<li>{t} <form class=\"inline\" method=\"post\" action=\"/config/{t}/new\">\
                 <button type=\"submit\">add to dashboard</button></form></li>\n",
                t = html_escape(table),
            ));
        }
        content.push_str("</ul>\n");
    }

    base_template("Dashboard", &content)
}

/// Config editor page for one table.
pub fn config_editor_page(table: &str, config_json: &str, error: Option<&str>) -> String {
    let error_block = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>\n", html_escape(msg)),
        None => String::new(),
    };

    let content = format!(
        "<h1>Views configuration: {t}</h1>\n{err}\
         <form method=\"post\" action=\"/config/{t}\">\n\
         <textarea name=\"views_config\">{json}</textarea>\n\
         <p><button type=\"submit\">Save</button> <a href=\"/\">Back</a></p>\n\
         </form>\n",
        t = html_escape(table),
        err = error_block,
        json = html_escape(config_json),
    );

    base_template(table, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>"a" & b</script>"#),
            "&lt;script&gt;&quot;a&quot; &amp; b&lt;/script&gt;"
        );
    }

    #[test]
    fn test_dashboard_page_lists_tables() {
        let html = dashboard_page(
            &[("rivers".to_string(), "map, gallery".to_string())],
            &["new_survey".to_string()],
        );
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("/config/rivers"));
        assert!(html.contains("map, gallery"));
        assert!(html.contains("new_survey"));
    }
}
