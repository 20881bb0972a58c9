//! Route table and view composition
//!
//! [`compose_view`] is a pure function of the navigation path and the
//! session state. It decides two things: whether the shared chrome
//! (header/footer banner) is shown, and whether the navigation must be
//! redirected. It has no side effects; callers trigger the redirect.

/// Login page path; the only path with chrome suppressed.
pub const LOGIN_PATH: &str = "/login";
/// Home page path.
pub const HOME_PATH: &str = "/";
/// Static mission/about page path.
pub const ABOUT_PATH: &str = "/about";
/// Profile page path.
pub const PROFILE_PATH: &str = "/profile";
/// Class list path.
pub const CLASSES_PATH: &str = "/classes";
/// Own evaluations list path.
pub const MY_EVALUATIONS_PATH: &str = "/my-evaluations";
/// Statistics dashboard path.
pub const DASHBOARD_PATH: &str = "/cis-dashboard";
/// Per-student progress path.
pub const STUDENT_PROGRESS_PATH: &str = "/student-progress";

/// Class roster path for a class id.
pub fn class_roster_path(class_id: &str) -> String {
    format!("/classes/{}/students", class_id)
}

/// Evaluation form path for a student within a class.
pub fn evaluation_path(class_id: &str, student_id: &str) -> String {
    format!("/classes/{}/students/{}/evaluate", class_id, student_id)
}

/// Outcome of composing a view for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDecision {
    /// Whether the shared header/footer chrome is rendered.
    pub show_chrome: bool,
    /// Path to navigate to instead, when the route is not reachable.
    pub redirect_to: Option<&'static str>,
}

/// Paths reachable without authentication.
fn is_public(path: &str) -> bool {
    matches!(path, LOGIN_PATH | HOME_PATH | ABOUT_PATH)
}

/// Decide chrome visibility and reachability for one navigation.
///
/// Chrome is suppressed only on the login path, independent of
/// authentication state. Unauthenticated access to a protected path
/// redirects to the login path; authenticated access to the login path
/// redirects home.
///
/// # Examples
///
/// ```
/// use ciseval::view::{compose_view, CLASSES_PATH, LOGIN_PATH};
///
/// let decision = compose_view(CLASSES_PATH, false);
/// assert!(decision.show_chrome);
/// assert_eq!(decision.redirect_to, Some(LOGIN_PATH));
/// ```
pub fn compose_view(path: &str, authenticated: bool) -> ViewDecision {
    let show_chrome = path != LOGIN_PATH;

    let redirect_to = if !authenticated && !is_public(path) {
        Some(LOGIN_PATH)
    } else if authenticated && path == LOGIN_PATH {
        Some(HOME_PATH)
    } else {
        None
    };

    ViewDecision {
        show_chrome,
        redirect_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_suppressed_only_on_login_path() {
        assert!(!compose_view(LOGIN_PATH, false).show_chrome);
        assert!(!compose_view(LOGIN_PATH, true).show_chrome);

        for path in [
            HOME_PATH,
            ABOUT_PATH,
            PROFILE_PATH,
            CLASSES_PATH,
            MY_EVALUATIONS_PATH,
            DASHBOARD_PATH,
            STUDENT_PROGRESS_PATH,
        ] {
            assert!(
                compose_view(path, false).show_chrome,
                "chrome should show on {path}"
            );
            assert!(compose_view(path, true).show_chrome);
        }
    }

    #[test]
    fn test_protected_paths_redirect_to_login_when_unauthenticated() {
        for path in [PROFILE_PATH, CLASSES_PATH, MY_EVALUATIONS_PATH, DASHBOARD_PATH] {
            assert_eq!(compose_view(path, false).redirect_to, Some(LOGIN_PATH));
        }
        let roster = class_roster_path("10A");
        assert_eq!(compose_view(&roster, false).redirect_to, Some(LOGIN_PATH));
    }

    #[test]
    fn test_protected_paths_reachable_when_authenticated() {
        for path in [PROFILE_PATH, CLASSES_PATH, MY_EVALUATIONS_PATH] {
            assert_eq!(compose_view(path, true).redirect_to, None);
        }
    }

    #[test]
    fn test_public_paths_never_redirect_when_unauthenticated() {
        assert_eq!(compose_view(HOME_PATH, false).redirect_to, None);
        assert_eq!(compose_view(ABOUT_PATH, false).redirect_to, None);
        assert_eq!(compose_view(LOGIN_PATH, false).redirect_to, None);
    }

    #[test]
    fn test_login_path_redirects_home_when_authenticated() {
        assert_eq!(compose_view(LOGIN_PATH, true).redirect_to, Some(HOME_PATH));
    }

    #[test]
    fn test_path_builders() {
        assert_eq!(class_roster_path("c1"), "/classes/c1/students");
        assert_eq!(
            evaluation_path("c1", "s2"),
            "/classes/c1/students/s2/evaluate"
        );
    }
}
