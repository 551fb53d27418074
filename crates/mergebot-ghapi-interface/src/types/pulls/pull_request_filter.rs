/// Filter used to list open pull requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GhPullRequestFilter {
    /// Base branch name.
    pub base: Option<String>,
    /// Head, in the `owner:branch` form.
    pub head: Option<String>,
}

impl GhPullRequestFilter {
    pub fn with_base<T: Into<String>>(base: T) -> Self {
        Self {
            base: Some(base.into()),
            head: None,
        }
    }

    pub fn with_head<T: Into<String>>(owner: &str, branch: T) -> Self {
        Self {
            base: None,
            head: Some(format!("{}:{}", owner, branch.into())),
        }
    }
}
