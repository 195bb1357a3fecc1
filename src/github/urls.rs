//! Web URL helpers for rendered links.

/// Repository home page.
pub fn repository(owner: &str, name: &str) -> String {
    format!("https://github.com/{owner}/{name}")
}

/// A specific release, addressed by tag.
pub fn release(owner: &str, name: &str, tag: &str) -> String {
    format!("https://github.com/{owner}/{name}/releases/{tag}")
}

/// A user or organisation profile.
pub fn author(login: &str) -> String {
    format!("https://github.com/{login}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_well_formed() {
        assert_eq!(
            repository("alice", "plugin"),
            "https://github.com/alice/plugin"
        );
        assert_eq!(
            release("alice", "plugin", "v1.2"),
            "https://github.com/alice/plugin/releases/v1.2"
        );
        assert_eq!(author("alice"), "https://github.com/alice");
    }
}
