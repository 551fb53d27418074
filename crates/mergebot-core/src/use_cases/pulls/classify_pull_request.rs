use mergebot_config::MergeConfig;
use mergebot_ghapi_interface::types::{GhMergeableState, GhPullRequest};
use mergebot_models::{BranchKind, MergeStrategy};

/// Why a pull request is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Closed or already merged.
    NotOpen,
    /// Mergeability verdict is neither clean nor unstable.
    NotMergeable(GhMergeableState),
    /// The automerge label is missing.
    MissingAutomergeLabel,
    /// Base branch is neither the main branch nor a release branch.
    UnsupportedBaseBranch(String),
    /// The rollup conflict on the head commit was reported by a previous run.
    RollupConflictAlreadyReported,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "pull request is not open"),
            Self::NotMergeable(state) => write!(f, "mergeable state is '{state}'"),
            Self::MissingAutomergeLabel => write!(f, "automerge label is missing"),
            Self::UnsupportedBaseBranch(base) => write!(f, "base branch '{base}' is not handled"),
            Self::RollupConflictAlreadyReported => {
                write!(f, "rollup conflict was already reported")
            }
        }
    }
}

/// How an eligible pull request gets merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub target: BranchKind,
    pub strategy: MergeStrategy,
    /// Empty to let the platform use its default title.
    pub commit_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(MergePlan),
    Skip(SkipReason),
}

/// Decides whether a pull request can be merged automatically, and how.
///
/// Rules are evaluated in order: mergeability verdict, automerge label,
/// then base branch. The first failing rule gives the skip reason.
pub struct EligibilityClassifier<'a> {
    config: &'a MergeConfig,
}

impl<'a> EligibilityClassifier<'a> {
    pub fn new(config: &'a MergeConfig) -> Self {
        Self { config }
    }

    /// Role of a base branch, `None` when it is not handled.
    pub fn branch_kind(&self, base: &str) -> Option<BranchKind> {
        if base == self.config.main_branch {
            Some(BranchKind::Main)
        } else if self.config.release_branches.iter().any(|b| b == base)
            || (!self.config.releases_prefix.is_empty()
                && base.starts_with(&self.config.releases_prefix))
        {
            Some(BranchKind::Release)
        } else {
            None
        }
    }

    pub fn classify(&self, pr: &GhPullRequest) -> Eligibility {
        let verdict = pr.mergeability();
        if !verdict.is_mergeable() {
            return Eligibility::Skip(SkipReason::NotMergeable(verdict));
        }

        if !pr
            .label_names()
            .into_iter()
            .any(|l| l == self.config.automerge_label)
        {
            return Eligibility::Skip(SkipReason::MissingAutomergeLabel);
        }

        let base = &pr.base.reference;
        match self.branch_kind(base) {
            Some(BranchKind::Main)
                if pr
                    .head
                    .reference
                    .starts_with(&self.config.fix_branch_prefix) =>
            {
                // Reconciliation branches keep the release history intact.
                Eligibility::Eligible(MergePlan {
                    target: BranchKind::Main,
                    strategy: MergeStrategy::Merge,
                    commit_title: String::new(),
                })
            }
            Some(BranchKind::Main) => Eligibility::Eligible(MergePlan {
                target: BranchKind::Main,
                strategy: MergeStrategy::Squash,
                commit_title: format!("{} (#{})", pr.title, pr.number),
            }),
            Some(BranchKind::Release) => Eligibility::Eligible(MergePlan {
                target: BranchKind::Release,
                strategy: MergeStrategy::Merge,
                commit_title: String::new(),
            }),
            None => Eligibility::Skip(SkipReason::UnsupportedBaseBranch(base.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use mergebot_config::Config;
    use mergebot_ghapi_interface::types::{GhBranch, GhLabel};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::tests::CoreContextTest;

    fn config() -> Config {
        CoreContextTest::new().config
    }

    fn pull_request(
        labels: &[&str],
        base: &str,
        head: &str,
        mergeable_state: GhMergeableState,
    ) -> GhPullRequest {
        GhPullRequest {
            number: 12,
            title: "Add feature".into(),
            labels: labels.iter().map(|&l| l.into()).collect::<Vec<GhLabel>>(),
            base: GhBranch {
                reference: base.into(),
                ..Default::default()
            },
            head: GhBranch {
                reference: head.into(),
                ..Default::default()
            },
            mergeable: Some(mergeable_state != GhMergeableState::Unknown),
            mergeable_state,
            ..Default::default()
        }
    }

    #[test]
    fn main_branch_is_squashed() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        assert_eq!(
            classifier.classify(&pull_request(
                &["Automerge"],
                "master",
                "feature",
                GhMergeableState::Clean
            )),
            Eligibility::Eligible(MergePlan {
                target: BranchKind::Main,
                strategy: MergeStrategy::Squash,
                commit_title: "Add feature (#12)".into()
            })
        );
    }

    #[test]
    fn reconciliation_branch_is_merged_into_main() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        assert_eq!(
            classifier.classify(&pull_request(
                &["Automerge"],
                "master",
                "fix-rollup-conflict/releases/2024-01",
                GhMergeableState::Unstable
            )),
            Eligibility::Eligible(MergePlan {
                target: BranchKind::Main,
                strategy: MergeStrategy::Merge,
                commit_title: String::new()
            })
        );
    }

    #[test]
    fn release_branches_are_merged() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        for base in ["releases/2024-01", "release"] {
            assert_eq!(
                classifier.classify(&pull_request(
                    &["Automerge"],
                    base,
                    "hotfix",
                    GhMergeableState::Clean
                )),
                Eligibility::Eligible(MergePlan {
                    target: BranchKind::Release,
                    strategy: MergeStrategy::Merge,
                    commit_title: String::new()
                })
            );
        }
    }

    #[test]
    fn unknown_base_is_skipped() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        assert_eq!(
            classifier.classify(&pull_request(
                &["Automerge"],
                "develop",
                "feature",
                GhMergeableState::Clean
            )),
            Eligibility::Skip(SkipReason::UnsupportedBaseBranch("develop".into()))
        );
    }

    #[test]
    fn non_mergeable_verdicts_are_skipped_first() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        for state in [
            GhMergeableState::Behind,
            GhMergeableState::Blocked,
            GhMergeableState::Dirty,
            GhMergeableState::Draft,
            GhMergeableState::HasHooks,
            GhMergeableState::Unknown,
        ] {
            for base in ["master", "releases/2024-01", "develop"] {
                assert_eq!(
                    classifier.classify(&pull_request(&[], base, "feature", state)),
                    Eligibility::Skip(SkipReason::NotMergeable(state))
                );
            }
        }
    }

    #[test]
    fn missing_label_is_skipped() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);

        for state in [GhMergeableState::Clean, GhMergeableState::Unstable] {
            for base in ["master", "releases/2024-01", "develop"] {
                assert_eq!(
                    classifier.classify(&pull_request(
                        &["automerge", "Bug"],
                        base,
                        "feature",
                        state
                    )),
                    Eligibility::Skip(SkipReason::MissingAutomergeLabel)
                );
            }
        }
    }

    #[test]
    fn classification_is_stable() {
        let config = config();
        let classifier = EligibilityClassifier::new(&config.merge);
        let pr = pull_request(&["Automerge"], "master", "feature", GhMergeableState::Clean);

        assert_eq!(classifier.classify(&pr), classifier.classify(&pr));
    }
}
