//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod viewer;

pub use category::Category;
pub use comment::Comment;
pub use location::Location;
pub use post::{Post, PostDraft};
pub use user::{ProfileDraft, User};
pub use viewer::Viewer;

use std::borrow::Cow;

const EXCERPT_LIMIT: usize = 50;

/// Shortens `text` for listings and log lines: anything longer than 50
/// characters is cut to 47 and suffixed with `...`.
pub fn excerpt(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= EXCERPT_LIMIT {
        return Cow::Borrowed(text);
    }
    let mut short: String = text.chars().take(EXCERPT_LIMIT - 3).collect();
    short.push_str("...");
    Cow::Owned(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_keeps_short_text() {
        assert_eq!(excerpt("Morning in Tbilisi"), "Morning in Tbilisi");
        assert_eq!(excerpt(&"a".repeat(50)), "a".repeat(50));
    }

    #[test]
    fn test_excerpt_truncates_long_text() {
        let long = "ж".repeat(51);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), 50);
        assert!(short.ends_with("..."));
    }
}
