//! Share connection string codec
//!
//! Format: `sambaPath=\\server\folder;username=bob;domain=CORP;password=secret`
//!
//! Keys are case-insensitive. Values may be wrapped in `"` or `'`; inside a
//! quoted value the quote character is escaped by doubling it.

use super::key::Credentials;
use std::str::FromStr;

pub const SHARE_PATH_KEY: &str = "sambaPath";
pub const USERNAME_KEY: &str = "username";
pub const DOMAIN_KEY: &str = "domain";
pub const PASSWORD_KEY: &str = "password";

/// Connection string parse errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("Missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("Malformed segment at byte {0}: expected key=value")]
    MalformedSegment(usize),
    #[error("Unterminated quoted value for key '{0}'")]
    UnterminatedQuote(String),
}

/// Share location and logon credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSettings {
    /// Share root, e.g. `\\server\folder`
    pub share_path: String,
    pub credentials: Credentials,
}

impl ShareSettings {
    /// Decode a connection string
    ///
    /// `sambaPath` and `username` are required; `domain` and `password`
    /// default to empty. Unknown keys are ignored.
    pub fn decode(input: &str) -> Result<Self, ConnectionStringError> {
        let mut share_path = None;
        let mut username = None;
        let mut domain = None;
        let mut password = None;

        for (key, value) in parse_pairs(input)? {
            let slot = if key.eq_ignore_ascii_case(SHARE_PATH_KEY) {
                &mut share_path
            } else if key.eq_ignore_ascii_case(USERNAME_KEY) {
                &mut username
            } else if key.eq_ignore_ascii_case(DOMAIN_KEY) {
                &mut domain
            } else if key.eq_ignore_ascii_case(PASSWORD_KEY) {
                &mut password
            } else {
                continue;
            };
            // Last occurrence wins
            *slot = Some(value);
        }

        Ok(Self {
            share_path: share_path.ok_or(ConnectionStringError::MissingKey(SHARE_PATH_KEY))?,
            credentials: Credentials {
                username: username.ok_or(ConnectionStringError::MissingKey(USERNAME_KEY))?,
                domain: domain.unwrap_or_default(),
                password: password.unwrap_or_default(),
            },
        })
    }

    /// Encode as a connection string
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in [
            (SHARE_PATH_KEY, &self.share_path),
            (USERNAME_KEY, &self.credentials.username),
            (DOMAIN_KEY, &self.credentials.domain),
            (PASSWORD_KEY, &self.credentials.password),
        ] {
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&quote_value(value));
        }
        out
    }
}

impl FromStr for ShareSettings {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Split `input` into trimmed key/value pairs
fn parse_pairs(input: &str) -> Result<Vec<(String, String)>, ConnectionStringError> {
    let mut pairs = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        // Skip separators and leading whitespace
        while pos < bytes.len() && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let key_start = pos;
        let eq = input[pos..]
            .find(['=', ';'])
            .map(|i| pos + i)
            .filter(|&i| bytes[i] == b'=')
            .ok_or(ConnectionStringError::MalformedSegment(key_start))?;
        let key = input[key_start..eq].trim();
        if key.is_empty() {
            return Err(ConnectionStringError::MalformedSegment(key_start));
        }
        pos = eq + 1;

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let value = match bytes.get(pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let (value, end) = parse_quoted(input, pos + 1, quote as char)
                    .ok_or_else(|| ConnectionStringError::UnterminatedQuote(key.to_string()))?;
                pos = end;
                // Only whitespace may follow the closing quote
                while pos < bytes.len() && bytes[pos] != b';' {
                    if !bytes[pos].is_ascii_whitespace() {
                        return Err(ConnectionStringError::MalformedSegment(pos));
                    }
                    pos += 1;
                }
                value
            }
            _ => {
                let end = input[pos..].find(';').map(|i| pos + i).unwrap_or(bytes.len());
                let value = input[pos..end].trim().to_string();
                pos = end;
                value
            }
        };

        pairs.push((key.to_string(), value));
    }

    Ok(pairs)
}

/// Read a quoted value starting after the opening quote
///
/// Returns the unescaped value and the index just past the closing quote.
fn parse_quoted(input: &str, start: usize, quote: char) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = input[start..].char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != quote {
            value.push(c);
            continue;
        }
        if matches!(chars.peek(), Some(&(_, next)) if next == quote) {
            chars.next();
            value.push(quote);
            continue;
        }
        return Some((value, start + i + c.len_utf8()));
    }
    None
}

/// Quote a value when it would not survive a plain round trip
fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains([';', '=', '"', '\'']) || value.trim() != value;
    if !needs_quotes {
        return value.to_string();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain() {
        let settings =
            ShareSettings::decode(r"sambaPath=\\files\media;username=bob;domain=CORP;password=pw")
                .unwrap();
        assert_eq!(settings.share_path, r"\\files\media");
        assert_eq!(settings.credentials.username, "bob");
        assert_eq!(settings.credentials.domain, "CORP");
        assert_eq!(settings.credentials.password, "pw");
    }

    #[test]
    fn test_decode_keys_case_insensitive_and_trimmed() {
        let settings: ShareSettings = " SAMBAPATH = //nas/share ; UserName=bob ;".parse().unwrap();
        assert_eq!(settings.share_path, "//nas/share");
        assert_eq!(settings.credentials.username, "bob");
        assert_eq!(settings.credentials.domain, "");
        assert_eq!(settings.credentials.password, "");
    }

    #[test]
    fn test_decode_quoted_values() {
        let settings = ShareSettings::decode(
            r#"sambaPath='\\files\a;b';username=bob;password="p""w;=d ""#,
        )
        .unwrap();
        assert_eq!(settings.share_path, r"\\files\a;b");
        assert_eq!(settings.credentials.password, "p\"w;=d ");
    }

    #[test]
    fn test_decode_missing_keys() {
        assert_eq!(
            ShareSettings::decode("username=bob").unwrap_err(),
            ConnectionStringError::MissingKey(SHARE_PATH_KEY)
        );
        assert_eq!(
            ShareSettings::decode(r"sambaPath=\\x\y").unwrap_err(),
            ConnectionStringError::MissingKey(USERNAME_KEY)
        );
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            ShareSettings::decode("sambaPath;username=bob"),
            Err(ConnectionStringError::MalformedSegment(0))
        ));
        assert!(matches!(
            ShareSettings::decode("username=\"bob"),
            Err(ConnectionStringError::UnterminatedQuote(_))
        ));
        assert!(matches!(
            ShareSettings::decode("username=\"bob\"x;sambaPath=a"),
            Err(ConnectionStringError::MalformedSegment(_))
        ));
    }

    #[test]
    fn test_encode_quotes_when_needed() {
        let settings = ShareSettings {
            share_path: r"\\files\media".to_string(),
            credentials: Credentials::new("bob", "", "a;b\"c"),
        };
        let encoded = settings.encode();
        assert_eq!(
            encoded,
            r#"sambaPath=\\files\media;username=bob;domain=;password="a;b""c""#
        );
        assert_eq!(ShareSettings::decode(&encoded).unwrap(), settings);
    }
}
