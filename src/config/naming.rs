//! Field-to-flag name mapping

use crate::app::AppName;

/// Convert a field identifier into a lowercase, hyphen-separated flag name
///
/// A word boundary is placed before an uppercase letter when the previous
/// character was not uppercase, or when the letter starts a new capitalized
/// word (`HTTPServer` -> `http-server`). An acronym run stays one word.
/// Underscores are explicit boundaries, so snake_case identifiers map the
/// same way as their mixed-case spelling.
pub fn flag_name(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut flag = String::with_capacity(identifier.len() + 4);
    let mut prev_upper = true;

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            push_boundary(&mut flag);
            prev_upper = true;
            continue;
        }

        if c.is_uppercase() {
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && (!prev_upper || next_lower) {
                push_boundary(&mut flag);
            }
            prev_upper = true;
        } else {
            prev_upper = false;
        }

        flag.extend(c.to_lowercase());
    }

    if flag.ends_with('-') {
        flag.pop();
    }
    flag
}

/// Environment variable backing a flag: `<APP>_<FLAG_UPPER_SNAKE>`
pub fn env_var_name(app: &AppName, flag: &str) -> String {
    app.env_var(flag)
}

fn push_boundary(flag: &mut String) {
    if !flag.is_empty() && !flag.ends_with('-') {
        flag.push('-');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_case_words() {
        assert_eq!(flag_name("MaxRetryCount"), "max-retry-count");
        assert_eq!(flag_name("Verbose"), "verbose");
        assert_eq!(flag_name("listenAddress"), "listen-address");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(flag_name("HTTPServer"), "http-server");
        assert_eq!(flag_name("UserIDName"), "user-id-name");
        assert_eq!(flag_name("UserID"), "user-id");
        assert_eq!(flag_name("ID"), "id");
        assert_eq!(flag_name("TLSCertFile"), "tls-cert-file");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(flag_name("max_retry_count"), "max-retry-count");
        assert_eq!(flag_name("_leading__double_"), "leading-double");
        assert_eq!(flag_name("http_Server"), "http-server");
    }

    #[test]
    fn test_digits() {
        assert_eq!(flag_name("Ipv6Enabled"), "ipv6-enabled");
        assert_eq!(flag_name("s3_bucket"), "s3-bucket");
    }

    #[test]
    fn test_no_uppercase_and_hyphens_only_at_boundaries() {
        for identifier in ["MaxRetryCount", "HTTPServer", "DBConnURL", "a", "A", "aB", "Ab"] {
            let flag = flag_name(identifier);
            assert!(!flag.chars().any(char::is_uppercase), "{identifier} -> {flag}");
            assert!(!flag.starts_with('-') && !flag.ends_with('-'), "{identifier} -> {flag}");
            assert!(!flag.contains("--"), "{identifier} -> {flag}");
        }
    }

    #[test]
    fn test_env_var_name() {
        let app = AppName::new("indexer");
        assert_eq!(env_var_name(&app, "max-retry-count"), "INDEXER_MAX_RETRY_COUNT");
    }
}
