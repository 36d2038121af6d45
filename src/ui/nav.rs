//! Sidebar navigation items

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::escape_html;
use crate::models::user::Role;

/// Icon of a navigation entry: either a symbolic name looked up in the
/// icon table, or markup that is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavIcon {
    Icon { name: String },
    Element { markup: String },
}

/// Where a navigation entry leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavTarget {
    /// Route handled by the client router
    Internal { path: String },
    /// Any other URL, opened in a new browsing context
    External { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavItem {
    pub title: String,
    pub icon: Option<NavIcon>,
    pub badge: Option<String>,
    pub target: NavTarget,
    /// Roles the entry is shown to; empty means everyone, signed in or not
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A navigation entry resolved against the current location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavLink {
    Internal {
        title: String,
        path: String,
        active: bool,
        icon: String,
        badge: Option<String>,
    },
    External {
        title: String,
        url: String,
        icon: String,
        badge: Option<String>,
    },
}

const FALLBACK_ICON: &str = "circle";

/// Symbolic icon names to Bootstrap Icons classes
const ICONS: &[(&str, &str)] = &[
    ("dashboard", "speedometer2"),
    ("lab", "building"),
    ("equipment", "cpu"),
    ("request", "clipboard-check"),
    ("history", "clock-history"),
    ("users", "people"),
    ("report", "bar-chart"),
    ("export", "file-earmark-spreadsheet"),
    ("help", "question-circle"),
];

fn icon_class(name: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, class)| *class)
        .unwrap_or(FALLBACK_ICON)
}

impl NavIcon {
    /// Markup for the icon slot
    pub fn markup(&self) -> String {
        match self {
            NavIcon::Icon { name } => {
                format!(r#"<i class="bi bi-{}" aria-hidden="true"></i>"#, icon_class(name))
            }
            NavIcon::Element { markup } => markup.clone(),
        }
    }
}

impl NavItem {
    pub fn internal(title: &str, path: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            icon: Some(NavIcon::Icon { name: icon.to_string() }),
            badge: None,
            target: NavTarget::Internal { path: path.to_string() },
            roles: Vec::new(),
        }
    }

    pub fn external(title: &str, url: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            icon: Some(NavIcon::Icon { name: icon.to_string() }),
            badge: None,
            target: NavTarget::External { url: url.to_string() },
            roles: Vec::new(),
        }
    }

    pub fn for_roles(mut self, roles: &[Role]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    pub fn with_badge(mut self, badge: &str) -> Self {
        self.badge = Some(badge.to_string());
        self
    }

    pub fn visible_to(&self, role: Option<Role>) -> bool {
        self.roles.is_empty() || role.map(|r| self.roles.contains(&r)).unwrap_or(false)
    }

    /// Resolve against the current path. Internal entries are active on an
    /// exact path match only.
    pub fn resolve(&self, current_path: &str) -> NavLink {
        let icon = self.icon.as_ref().map(NavIcon::markup).unwrap_or_default();
        match &self.target {
            NavTarget::External { url } => NavLink::External {
                title: self.title.clone(),
                url: url.clone(),
                icon,
                badge: self.badge.clone(),
            },
            NavTarget::Internal { path } => NavLink::Internal {
                title: self.title.clone(),
                path: path.clone(),
                active: path == current_path,
                icon,
                badge: self.badge.clone(),
            },
        }
    }
}

impl NavLink {
    pub fn is_active(&self) -> bool {
        matches!(self, NavLink::Internal { active: true, .. })
    }

    /// Render as a sidebar anchor. Internal links carry `data-router-link`
    /// so the client router intercepts them instead of reloading the page.
    pub fn render(&self) -> String {
        match self {
            NavLink::Internal { title, path, active, icon, badge } => {
                let (class, current) = if *active {
                    ("sidebar-link active", r#" aria-current="page""#)
                } else {
                    ("sidebar-link", "")
                };
                format!(
                    r#"<a class="{}" href="{}" data-router-link{}>{}<span class="hide-menu">{}</span>{}</a>"#,
                    class,
                    escape_html(path),
                    current,
                    icon,
                    escape_html(title),
                    render_badge(badge.as_deref()),
                )
            }
            NavLink::External { title, url, icon, badge } => format!(
                r#"<a class="sidebar-link" href="{}" target="_blank" rel="noopener noreferrer">{}<span class="hide-menu">{}</span>{}</a>"#,
                escape_html(url),
                icon,
                escape_html(title),
                render_badge(badge.as_deref()),
            ),
        }
    }
}

fn render_badge(badge: Option<&str>) -> String {
    badge
        .map(|text| format!(r#"<span class="badge rounded-pill">{}</span>"#, escape_html(text)))
        .unwrap_or_default()
}

/// The application sidebar
pub fn sidebar_items() -> Vec<NavItem> {
    const STAFF: &[Role] = &[Role::Tecnico, Role::Admin];
    const SIGNED_IN: &[Role] = &[Role::Estudiante, Role::Docente, Role::Tecnico, Role::Admin];

    vec![
        NavItem::internal("Inicio", "/", "dashboard"),
        NavItem::internal("Laboratorios", "/labs", "lab").for_roles(SIGNED_IN),
        NavItem::internal("Mis solicitudes", "/requests", "request").for_roles(SIGNED_IN),
        NavItem::internal("Historial", "/history", "history").for_roles(SIGNED_IN),
        NavItem::internal("Todas las solicitudes", "/requests/admin/all", "request").for_roles(STAFF),
        NavItem::internal("Reportes", "/admin/reports", "report").for_roles(STAFF),
        NavItem::internal("Usuarios", "/admin/users", "users").for_roles(&[Role::Admin]),
        NavItem::external("Ayuda", "https://docs.labreserva.org", "help").with_badge("docs"),
    ]
}

/// Sidebar entries visible to `role`, resolved against `current_path`
pub fn resolve_sidebar(items: &[NavItem], role: Option<Role>, current_path: &str) -> Vec<NavLink> {
    items
        .iter()
        .filter(|item| item.visible_to(role))
        .map(|item| item.resolve(current_path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_items_open_in_a_new_context() {
        let link = NavItem::external("Ayuda", "https://example.org/?a=1&b=2", "help").resolve("/");
        assert!(!link.is_active());

        let html = link.render();
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
        assert!(html.contains("https://example.org/?a=1&amp;b=2"));
        assert!(!html.contains("data-router-link"));
    }

    #[test]
    fn internal_items_are_active_on_exact_match_only() {
        let item = NavItem::internal("Mis solicitudes", "/requests", "request");

        assert!(item.resolve("/requests").is_active());
        assert!(!item.resolve("/requests/12").is_active());
        assert!(!item.resolve("/requests/").is_active());

        let html = item.resolve("/requests").render();
        assert!(html.contains("data-router-link"));
        assert!(html.contains(r#"class="sidebar-link active""#));
        assert!(html.contains(r#"aria-current="page""#));
        assert!(!item.resolve("/labs").render().contains("active"));
    }

    #[test]
    fn icons_resolve_by_name_or_pass_through() {
        assert!(NavIcon::Icon { name: "lab".into() }.markup().contains("bi-building"));
        assert!(NavIcon::Icon { name: "unknown".into() }.markup().contains("bi-circle"));

        let element = NavIcon::Element { markup: "<svg id=\"logo\"></svg>".into() };
        assert_eq!(element.markup(), "<svg id=\"logo\"></svg>");
    }

    #[test]
    fn badges_and_titles_are_escaped() {
        let html = NavItem::internal("<b>", "/x", "help")
            .with_badge("3 & más")
            .resolve("/x")
            .render();
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains(r#"<span class="badge rounded-pill">3 &amp; más</span>"#));
    }

    #[test]
    fn sidebar_is_filtered_by_role() {
        let items = sidebar_items();

        let anonymous = resolve_sidebar(&items, None, "/");
        assert_eq!(anonymous.len(), 2);
        assert!(anonymous[0].is_active());

        let student = resolve_sidebar(&items, Some(Role::Estudiante), "/requests");
        assert!(student.iter().any(NavLink::is_active));
        assert!(!student.iter().any(|l| matches!(l, NavLink::Internal { path, .. } if path == "/admin/users")));

        let admin = resolve_sidebar(&items, Some(Role::Admin), "/");
        assert_eq!(admin.len(), items.len());
    }

    #[test]
    fn nav_items_deserialize_from_tagged_json() {
        let item: NavItem = serde_json::from_str(
            r#"{"title":"Logo","icon":{"kind":"element","markup":"<img>"},"badge":null,
                "target":{"kind":"external","url":"https://x.test"}}"#,
        )
        .unwrap();
        assert_eq!(item.icon, Some(NavIcon::Element { markup: "<img>".into() }));
        assert!(item.roles.is_empty());
        assert!(matches!(item.resolve("/"), NavLink::External { .. }));
    }
}
