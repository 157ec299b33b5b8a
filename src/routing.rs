//! Route resolution and access guards.
//!
//! Given a requested path and who is asking, decide which page to show or where
//! to send them instead. Nothing here renders anything.

use crate::backend::Session;
use crate::config::AuthConfig;
use crate::entities::Profile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/` with a session
    Feed,
    /// `/` without a session
    Landing,
    Login,
    ResetPassword,
    About,
    Courses,
    UserDashboard,
    AdminDashboard,
    NotFound(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    SignedIn,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

impl RouteDecision {
    /// The route that ends up on screen.
    pub fn route(&self) -> &Route {
        match self {
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => route,
        }
    }
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Feed | Route::Landing => "/",
            Route::Login => "/login",
            Route::ResetPassword => "/reset-password",
            Route::About => "/about",
            Route::Courses => "/courses",
            Route::UserDashboard => "/user-dashboard",
            Route::AdminDashboard => "/admin-dashboard",
            Route::NotFound(path) => path,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::UserDashboard => Access::SignedIn,
            Route::AdminDashboard => Access::Admin,
            _ => Access::Public,
        }
    }

    /// Where a user lands after signing in.
    pub fn home_for(is_admin: bool) -> Route {
        if is_admin {
            Route::AdminDashboard
        } else {
            Route::UserDashboard
        }
    }
}

/// Who is asking for a route.
#[derive(Clone, Debug, Default)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub profile: Option<Profile>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_session(session: &Session, profile: Option<Profile>) -> Self {
        Self {
            user_id: Some(session.user_id().to_string()),
            email: session.email().map(str::to_string),
            profile,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Admin when the profile says so or the session belongs to the admin account.
    pub fn is_admin(&self, auth: &AuthConfig) -> bool {
        if !self.is_signed_in() {
            return false;
        }
        let flagged = self.profile.as_ref().is_some_and(Profile::has_admin_flag);
        let email = self
            .email
            .as_deref()
            .or_else(|| self.profile.as_ref().and_then(|p| p.email.as_deref()));
        flagged || email.is_some_and(|email| auth.is_admin_email(email))
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Legacy paths that forward to a current route.
fn alias_target(path: &str) -> Option<Route> {
    match path {
        "/notes" => Some(Route::UserDashboard),
        "/admin" => Some(Route::AdminDashboard),
        _ => None,
    }
}

fn route_for(path: &str, viewer: &Viewer) -> Route {
    match path {
        "/" if viewer.is_signed_in() => Route::Feed,
        "/" => Route::Landing,
        "/login" => Route::Login,
        "/reset-password" => Route::ResetPassword,
        "/about" => Route::About,
        "/courses" => Route::Courses,
        "/user-dashboard" => Route::UserDashboard,
        "/admin-dashboard" => Route::AdminDashboard,
        other => Route::NotFound(other.to_string()),
    }
}

/// Apply the route's guard: `None` when the viewer may see it.
fn guard(route: &Route, viewer: &Viewer, auth: &AuthConfig) -> Option<Route> {
    match route.access() {
        Access::Public => None,
        Access::SignedIn if !viewer.is_signed_in() => Some(Route::Login),
        Access::SignedIn => None,
        Access::Admin if !viewer.is_signed_in() => Some(Route::Login),
        Access::Admin if !viewer.is_admin(auth) => Some(Route::UserDashboard),
        Access::Admin => None,
    }
}

/// Decide what to show for `path`.
pub fn resolve(path: &str, viewer: &Viewer, auth: &AuthConfig) -> RouteDecision {
    let path = normalize(path);

    if let Some(target) = alias_target(&path) {
        return match guard(&target, viewer, auth) {
            Some(redirect) => RouteDecision::Redirect(redirect),
            None => RouteDecision::Redirect(target),
        };
    }

    let route = route_for(&path, viewer);
    match guard(&route, viewer, auth) {
        Some(redirect) => RouteDecision::Redirect(redirect),
        None => RouteDecision::Render(route),
    }
}
