const STYLESHEET_TAG: &str = r#"<link rel="stylesheet" href="styles.css">"#;
const SCRIPT_TAG: &str = r#"<script src="script.js"></script>"#;

fn has_stylesheet_reference(html: &str) -> bool {
    html.contains("styles.css") || (html.contains("<link") && html.contains("stylesheet"))
}

fn has_script_reference(html: &str) -> bool {
    html.contains("script.js") || (html.contains("<script") && html.contains("src="))
}

/// Make `html` reference `styles.css` and `script.js` as external files when the
/// matching asset has content. Running it again is a no-op.
pub fn link_assets(html: &str, css: &str, js: &str) -> String {
    let mut linked = html.to_string();

    if !css.trim().is_empty() && !has_stylesheet_reference(&linked) {
        if let Some(pos) = linked.find("</head>") {
            linked.insert_str(pos, &format!("    {}\n", STYLESHEET_TAG));
        } else if let Some(pos) = linked.find("<head>") {
            linked.insert_str(pos + "<head>".len(), &format!("\n    {}", STYLESHEET_TAG));
        }
    }

    if !js.trim().is_empty() && !has_script_reference(&linked) {
        if let Some(pos) = linked.rfind("</body>") {
            linked.insert_str(pos, &format!("    {}\n", SCRIPT_TAG));
        } else if let Some(pos) = linked.rfind("</html>") {
            linked.insert_str(pos, &format!("\n    {}\n", SCRIPT_TAG));
        }
    }

    linked
}
