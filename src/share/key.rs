//! Share credentials and pool keys

use std::fmt;

/// Logon credentials for a network share
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub username: String,
    pub domain: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            password: password.into(),
        }
    }

    /// Name passed to the share logon: `DOMAIN\user`, or `user` without a domain
    pub fn logon_name(&self) -> String {
        if self.domain.is_empty() {
            self.username.clone()
        } else {
            format!("{}\\{}", self.domain, self.username)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity of one shareable connection
///
/// Username and domain are case-folded so credential-equivalent requests
/// map to the same pool entry. The password is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    share: String,
    username: String,
    domain: String,
}

impl ConnectionKey {
    /// Build the key for `share` accessed with `credentials`
    pub fn new(share: &str, credentials: &Credentials) -> Self {
        Self {
            share: normalize_share(share).to_string(),
            username: credentials.username.to_lowercase(),
            domain: credentials.domain.to_lowercase(),
        }
    }

    /// Share name without trailing separators
    #[inline]
    pub fn share(&self) -> &str {
        &self.share
    }

    /// Lowercased username
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Lowercased domain
    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.domain, self.share)
    }
}

/// Strip trailing `\` and `/`, keeping a bare root intact
fn normalize_share(share: &str) -> &str {
    let trimmed = share.trim_end_matches(['\\', '/']);
    if trimmed.is_empty() {
        share
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_folds_user_and_domain_case() {
        let a = ConnectionKey::new(r"\\files\media", &Credentials::new("Alice", "CORP", "x"));
        let b = ConnectionKey::new(r"\\files\media", &Credentials::new("alice", "corp", "y"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), r"alice@corp:\\files\media");
    }

    #[test]
    fn test_key_keeps_share_case() {
        let creds = Credentials::new("bob", "", "");
        let a = ConnectionKey::new(r"\\files\Media", &creds);
        let b = ConnectionKey::new(r"\\files\media", &creds);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_trims_trailing_separators() {
        let creds = Credentials::new("bob", "", "");
        let a = ConnectionKey::new(r"\\files\media\", &creds);
        let b = ConnectionKey::new(r"\\files\media", &creds);
        let c = ConnectionKey::new("//files/media/", &creds);
        assert_eq!(a, b);
        assert_eq!(c.share(), "//files/media");
        assert_eq!(ConnectionKey::new("/", &creds).share(), "/");
    }

    #[test]
    fn test_logon_name() {
        assert_eq!(Credentials::new("bob", "CORP", "").logon_name(), r"CORP\bob");
        assert_eq!(Credentials::new("bob", "", "").logon_name(), "bob");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("bob", "corp", "hunter2");
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
