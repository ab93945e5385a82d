//! Per-action authorization gates.
//!
//! Gates are pure decisions over the current identity (if any). Turning a
//! decision into a redirect is the caller's job.

use uuid::Uuid;

use crate::domain::Post;

/// Login endpoint that denied requests are sent to.
pub const LOGIN_URL: &str = "/auth/login/";

/// Outcome of an authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The action may proceed.
    Allow,
    /// No identity; send the caller to log in and come back.
    Login,
    /// Authenticated but not permitted; show the post instead.
    ViewPost(Uuid),
}

/// Creating a post only needs an identity.
pub fn create_gate(viewer: Option<Uuid>) -> Gate {
    match viewer {
        Some(_) => Gate::Allow,
        None => Gate::Login,
    }
}

/// Editing a post needs an identity equal to the post's author.
pub fn edit_gate(viewer: Option<Uuid>, post: &Post) -> Gate {
    match viewer {
        None => Gate::Login,
        Some(user_id) if post.is_authored_by(user_id) => Gate::Allow,
        Some(_) => Gate::ViewPost(post.id),
    }
}

/// Login URL carrying a return path, e.g. `/auth/login/?next=/create/`.
pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", encode_next(next))
}

/// `/` stays readable; `%` and characters that would end or split the query
/// are escaped, so the raw path comes back byte for byte.
fn encode_next(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            '+' => out.push_str("%2B"),
            ' ' => out.push_str("%20"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

/// Profile path of a user, the landing page after creating a post.
pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn post_edit_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/edit/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;

    fn post_by(author: Uuid) -> Post {
        Post::new(
            author,
            PostDraft {
                text: "text".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_create_requires_identity() {
        assert_eq!(create_gate(None), Gate::Login);
        assert_eq!(create_gate(Some(Uuid::new_v4())), Gate::Allow);
    }

    #[test]
    fn test_edit_allows_author() {
        let author = Uuid::new_v4();
        assert_eq!(edit_gate(Some(author), &post_by(author)), Gate::Allow);
    }

    #[test]
    fn test_edit_sends_stranger_to_post() {
        let post = post_by(Uuid::new_v4());
        assert_eq!(
            edit_gate(Some(Uuid::new_v4()), &post),
            Gate::ViewPost(post.id)
        );
    }

    #[test]
    fn test_edit_anonymous_must_login() {
        assert_eq!(edit_gate(None, &post_by(Uuid::new_v4())), Gate::Login);
    }

    #[test]
    fn test_login_redirect_keeps_slashes() {
        assert_eq!(login_redirect("/create/"), "/auth/login/?next=/create/");
    }

    #[test]
    fn test_login_redirect_escapes_query_breakers() {
        assert_eq!(
            login_redirect("/a&b=c/"),
            "/auth/login/?next=/a%26b%3Dc/"
        );
    }

    #[test]
    fn test_login_redirect_escapes_percent() {
        assert_eq!(
            login_redirect("/posts/a%26b/"),
            "/auth/login/?next=/posts/a%2526b/"
        );
    }
}
