//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Identity`] - Externally verified caller identifier
//! - [`RepoName`] - Validated repository name (registry primary key)
//! - [`BranchName`] - Validated branch name
//! - [`ContentRef`] - Opaque reference to externally stored content
//! - [`CommitId`] / [`PullRequestId`] - Sequential identifiers
//! - [`Amount`] - Stake amount in base units
//! - [`Visibility`] - Repository read visibility
//! - [`Fingerprint`] - Registry state hash for divergence detection
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! Names and identities enforce validity at construction time. Invalid
//! values cannot be represented, so a [`crate::core::transition::Transition`]
//! never carries a malformed name.
//!
//! # Examples
//!
//! ```
//! use codechain::core::types::{BranchName, Identity, RepoName};
//!
//! let owner = Identity::new("0xA11CE").unwrap();
//! let repo = RepoName::new("repo1").unwrap();
//! let branch = BranchName::main();
//!
//! assert_eq!(branch.as_str(), "main");
//! assert!(RepoName::new("").is_err());
//! assert!(Identity::new("has space").is_err());
//! # let _ = (owner, repo);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid repository name: {0}")]
    InvalidRepoName(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// An externally authenticated caller identity (address-like).
///
/// The core performs no signature verification; it only requires the
/// handle to be a single non-empty token so it can be compared and
/// displayed unambiguously.
///
/// # Example
///
/// ```
/// use codechain::core::types::Identity;
///
/// let id = Identity::new("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
/// assert_eq!(id.to_string(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
///
/// assert!(Identity::new("").is_err());
/// assert!(Identity::new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Create a new validated identity.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidIdentity` if the identity is empty or
    /// contains whitespace or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidIdentity(
                "identity cannot be empty".into(),
            ));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidIdentity(format!(
                "identity '{}' cannot contain whitespace or control characters",
                id.escape_debug()
            )));
        }
        Ok(Self(id))
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated repository name.
///
/// Repository names are the registry's primary key and are immutable once
/// registered. They must be non-empty, free of control characters, and
/// carry no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName(String);

impl RepoName {
    /// Maximum length of a repository name, in characters.
    pub const MAX_LEN: usize = 128;

    /// Create a new validated repository name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoName` if the name is empty, too long,
    /// padded with whitespace, or contains control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidRepoName(
                "repository name cannot be empty".into(),
            ));
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(TypeError::InvalidRepoName(format!(
                "repository name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }
        if name.trim() != name {
            return Err(TypeError::InvalidRepoName(
                "repository name cannot start or end with whitespace".into(),
            ));
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidRepoName(
                "repository name cannot contain control characters".into(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the repository name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RepoName> for String {
    fn from(name: RepoName) -> Self {
        name.0
    }
}

impl std::fmt::Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated branch name.
///
/// Branch names follow the familiar refname rules:
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// # Example
///
/// ```
/// use codechain::core::types::BranchName;
///
/// let name = BranchName::new("feature/login").unwrap();
/// assert_eq!(name.as_str(), "feature/login");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("bad..name").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Name of the branch every repository is created with.
    pub const MAIN: &'static str = "main";

    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates the rules above.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The default branch, `main`.
    pub fn main() -> Self {
        Self(Self::MAIN.to_string())
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }

        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot start with '{}'",
                &name[..1]
            )));
        }

        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }

        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{seq}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain control characters".into(),
            ));
        }

        if name.split('/').any(|component| component.starts_with('.')) {
            return Err(TypeError::InvalidBranchName(
                "path component cannot start with '.'".into(),
            ));
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to externally stored content (a directory tree).
///
/// Stored verbatim. The core never parses or validates its structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Wrap an external content handle.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit identifier, scoped to a branch.
///
/// Assigned as the branch length + 1, so the first commit is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(u64);

impl CommitId {
    /// Create a commit id from its raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id assigned to a commit appended to a history of `len` commits.
    pub fn following(len: usize) -> Self {
        Self(len as u64 + 1)
    }

    /// Raw value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Zero-based position of this commit in its branch history.
    ///
    /// Returns `None` for id 0, which is never assigned, and for ids that
    /// do not fit in `usize`.
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pull request identifier, scoped to a repository and assigned sequentially from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(u64);

impl PullRequestId {
    /// Create a pull request id from its raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stake amount in indivisible base units.
///
/// `Amount::TOKEN` is one whole token (10^18 base units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// One whole token in base units.
    pub const TOKEN: Amount = Amount(1_000_000_000_000_000_000);

    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from base units.
    pub fn new(base_units: u64) -> Self {
        Self(base_units)
    }

    /// Raw value in base units.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::str::FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .replace('_', "")
            .parse::<u64>()
            .map(Amount)
            .map_err(|e| TypeError::InvalidAmount(format!("'{}': {}", s, e)))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repository read visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Readable by owner and collaborators only.
    #[default]
    Private,
    /// Readable by any identity.
    Public,
}

impl Visibility {
    /// Map the boolean flag used by `set_visibility`.
    pub fn from_public(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    /// Whether this is [`Visibility::Public`].
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

/// A UTC timestamp, serialized as RFC3339.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// SHA-256 digest of a serialized state snapshot.
///
/// Two registries with equal fingerprints are byte-for-byte identical in
/// their serialized form, which is how rejected transitions are shown to
/// leave state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash raw bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex::encode(digest))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod identity {
        use super::*;

        #[test]
        fn valid_identities() {
            assert!(Identity::new("0xabc").is_ok());
            assert!(Identity::new("alice@example").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(matches!(
                Identity::new(""),
                Err(TypeError::InvalidIdentity(_))
            ));
        }

        #[test]
        fn whitespace_rejected() {
            assert!(Identity::new("a b").is_err());
            assert!(Identity::new("tab\there").is_err());
        }

        #[test]
        fn serde_rejects_invalid() {
            let parsed: Result<Identity, _> = serde_json::from_str("\"\"");
            assert!(parsed.is_err());
        }
    }

    mod repo_name {
        use super::*;

        #[test]
        fn allows_spaces_inside() {
            assert!(RepoName::new("my project").is_ok());
        }

        #[test]
        fn padded_rejected() {
            assert!(RepoName::new(" repo").is_err());
            assert!(RepoName::new("repo ").is_err());
        }

        #[test]
        fn too_long_rejected() {
            let name = "x".repeat(RepoName::MAX_LEN + 1);
            assert!(RepoName::new(name).is_err());
        }

        #[test]
        fn control_rejected() {
            assert!(RepoName::new("re\npo").is_err());
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn main_is_valid() {
            assert_eq!(BranchName::main(), BranchName::new("main").unwrap());
        }

        #[test]
        fn invalid_names() {
            for bad in [
                "", ".hidden", "-dash", "x.lock", "trail/", "a..b", "a@{b", "a//b", "a b",
                "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "dir/.hidden",
            ] {
                assert!(BranchName::new(bad).is_err(), "expected '{}' to be rejected", bad);
            }
        }

        #[test]
        fn valid_names() {
            for good in ["feature", "feature/x", "fix-123", "user@topic", "v1.2"] {
                assert!(BranchName::new(good).is_ok(), "expected '{}' to be accepted", good);
            }
        }
    }

    mod ids {
        use super::*;

        #[test]
        fn commit_id_following() {
            assert_eq!(CommitId::following(0), CommitId::new(1));
            assert_eq!(CommitId::following(4), CommitId::new(5));
        }

        #[test]
        fn commit_id_index() {
            assert_eq!(CommitId::new(1).index(), Some(0));
            assert_eq!(CommitId::new(0).index(), None);
            assert_eq!(
                CommitId::new(u64::MAX).index(),
                usize::try_from(u64::MAX - 1).ok()
            );
        }
    }

    mod amount {
        use super::*;

        #[test]
        fn parses_with_underscores() {
            let amount: Amount = "1_000".parse().unwrap();
            assert_eq!(amount, Amount::new(1000));
        }

        #[test]
        fn rejects_negative() {
            assert!("-5".parse::<Amount>().is_err());
        }

        #[test]
        fn ordering() {
            assert!(Amount::new(1) < Amount::TOKEN);
        }
    }

    mod fingerprint {
        use super::*;

        #[test]
        fn deterministic() {
            assert_eq!(Fingerprint::compute(b"abc"), Fingerprint::compute(b"abc"));
        }

        #[test]
        fn differs_by_content() {
            assert_ne!(Fingerprint::compute(b"abc"), Fingerprint::compute(b"abd"));
        }

        #[test]
        fn hex_encoded_sha256() {
            let fp = Fingerprint::compute(b"");
            assert_eq!(fp.as_str().len(), 64);
            assert!(fp.as_str().starts_with("e3b0c44"));
        }
    }

    #[test]
    fn timestamps_round_trip_as_rfc3339() {
        let ts = UtcTimestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let raw: String = serde_json::from_str(&json).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&raw).is_ok());
        let back: UtcTimestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn visibility_default_private() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert!(Visibility::from_public(true).is_public());
    }
}
