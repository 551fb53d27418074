use std::str::FromStr;

use thiserror::Error;

use crate::RepositoryPath;

/// Type error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PullRequestHandleError {
    /// Invalid pull request handle.
    #[error("Invalid pull request handle: {}", path)]
    InvalidPullRequestHandle { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestHandle {
    repository: RepositoryPath,
    number: u64,
}

impl std::fmt::Display for PullRequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} (#{})", self.repository, self.number))
    }
}

impl PullRequestHandle {
    pub fn new(repository: RepositoryPath, number: u64) -> Self {
        Self { repository, number }
    }

    pub fn repository_path(&self) -> &RepositoryPath {
        &self.repository
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn owner(&self) -> &str {
        self.repository.owner()
    }

    pub fn name(&self) -> &str {
        self.repository.name()
    }
}

impl From<(&str, &str, u64)> for PullRequestHandle {
    fn from((owner, name, number): (&str, &str, u64)) -> Self {
        Self {
            repository: (owner, name).into(),
            number,
        }
    }
}

impl FromStr for PullRequestHandle {
    type Err = PullRequestHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PullRequestHandleError::InvalidPullRequestHandle { path: s.into() };

        let (path, number) = s.rsplit_once('/').ok_or_else(invalid)?;
        let repository = path.parse::<RepositoryPath>().map_err(|_| invalid())?;
        let number = number.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self::new(repository, number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let handle = "me/test/12".parse::<PullRequestHandle>().unwrap();
        assert_eq!(handle.owner(), "me");
        assert_eq!(handle.name(), "test");
        assert_eq!(handle.number(), 12);
        assert_eq!(handle.to_string(), "me/test (#12)");

        assert!("me/test".parse::<PullRequestHandle>().is_err());
        assert!("me/test/abc".parse::<PullRequestHandle>().is_err());
    }
}
