//! Route table consulted by the navigation guard
//!
//! Every route states whether it needs an authenticated session. Nested
//! children do not inherit that flag from their parent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    #[serde(default)]
    pub title: Option<String>,
    pub requires_auth: bool,
}

impl RouteMeta {
    pub fn public(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            requires_auth: false,
        }
    }

    pub fn protected(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            requires_auth: true,
        }
    }

    pub fn untitled(requires_auth: bool) -> Self {
        Self {
            title: None,
            requires_auth,
        }
    }
}

/// Static declaration of a navigable path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
    pub name: String,
    /// Name of the view the host renders for this route
    pub component: String,
    pub meta: RouteMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        component: impl Into<String>,
        meta: RouteMeta,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            component: component.into(),
            meta,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }
}

/// A route matched against a concrete location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Full, normalized path
    pub path: String,
    pub name: String,
    pub component: String,
    pub meta: RouteMeta,
    /// Nesting depth, 0 for top-level routes
    pub depth: usize,
}

impl ResolvedRoute {
    pub fn requires_auth(&self) -> bool {
        self.meta.requires_auth
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The dashboard's routes: a public login page and a protected layout
    pub fn smartbi() -> Self {
        Self::new(vec![
            RouteDescriptor::new("/login", "Login", "views/login", RouteMeta::public("Login")),
            RouteDescriptor::new("/", "Layout", "layout", RouteMeta::untitled(true)).with_children(
                vec![
                    RouteDescriptor::new("", "Home", "views/home", RouteMeta::protected("Home")),
                    RouteDescriptor::new(
                        "analysis/overview",
                        "AnalysisOverview",
                        "views/analysis/overview",
                        RouteMeta::protected("Quote Audit"),
                    ),
                    RouteDescriptor::new(
                        "analysis/detail",
                        "AnalysisDetail",
                        "views/analysis/detail",
                        RouteMeta::protected("Data Analysis"),
                    ),
                ],
            ),
        ])
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// All routes with their full paths, parents before children
    pub fn flatten(&self) -> Vec<ResolvedRoute> {
        let mut out = Vec::new();
        for route in &self.routes {
            flatten_into(route, "", 0, &mut out);
        }
        out
    }

    /// Find the route for a location. When a parent and a child share a path
    /// the deepest route wins.
    pub fn resolve(&self, location: &str) -> Option<ResolvedRoute> {
        let target = normalize_path(location);
        let mut best: Option<ResolvedRoute> = None;
        for route in self.flatten() {
            if route.path != target {
                continue;
            }
            if best.as_ref().is_none_or(|b| route.depth > b.depth) {
                best = Some(route);
            }
        }
        best
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::smartbi()
    }
}

fn flatten_into(route: &RouteDescriptor, parent: &str, depth: usize, out: &mut Vec<ResolvedRoute>) {
    let path = join_paths(parent, &route.path);
    out.push(ResolvedRoute {
        path: path.clone(),
        name: route.name.clone(),
        component: route.component.clone(),
        meta: route.meta.clone(),
        depth,
    });
    for child in &route.children {
        flatten_into(child, &path, depth + 1, out);
    }
}

fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return normalize_path(child);
    }
    normalize_path(&format!("{}/{}", parent.trim_end_matches('/'), child))
}

/// Strip query and fragment, ensure a leading slash, drop trailing slashes
pub fn normalize_path(location: &str) -> String {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}
