//! Application layout shell

use super::{escape_html, nav::NavLink};

/// Resets the scroll position whenever the client router changes route
const SCROLL_RESET_SCRIPT: &str = r#"<script>
(function () {
  function reset() { window.scrollTo(0, 0); }
  window.addEventListener("popstate", reset);
  document.addEventListener("labreserva:navigate", reset);
})();
</script>"#;

/// Four fixed regions (topbar, sidebar, header, body) around the routed
/// outlet the client application renders into.
#[derive(Debug, Clone)]
pub struct FullLayout {
    pub title: String,
    pub topbar: String,
    pub sidebar: Vec<NavLink>,
}

impl FullLayout {
    pub fn new(title: &str, sidebar: Vec<NavLink>) -> Self {
        Self {
            title: title.to_string(),
            topbar: String::new(),
            sidebar,
        }
    }

    pub fn with_topbar(mut self, text: &str) -> Self {
        self.topbar = text.to_string();
        self
    }

    /// Render the full document with `outlet` as the routed content
    pub fn render(&self, outlet: &str) -> String {
        let nav: String = self
            .sidebar
            .iter()
            .map(|link| format!(r#"<li class="sidebar-item">{}</li>"#, link.render()))
            .collect();

        let page_title = self
            .sidebar
            .iter()
            .find_map(|link| match link {
                NavLink::Internal { title, active: true, .. } => Some(title.as_str()),
                _ => None,
            })
            .unwrap_or(self.title.as_str());

        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<div class="topbar" role="banner">{topbar}</div>
<div class="page-wrapper">
<aside class="left-sidebar"><nav class="sidebar-nav"><ul id="sidebarnav">{nav}</ul></nav></aside>
<div class="body-wrapper">
<header class="app-header"><h1 class="page-title">{page_title}</h1></header>
<main class="container-fluid"><div id="outlet" data-scroll-reset>{outlet}</div></main>
</div>
</div>
{script}
</body>
</html>"#,
            title = escape_html(&self.title),
            topbar = escape_html(&self.topbar),
            nav = nav,
            page_title = escape_html(page_title),
            outlet = outlet,
            script = SCROLL_RESET_SCRIPT,
        )
    }
}
