//! Storage key allocation and URL-safe encodings.

use uuid::Uuid;

/// Build the storage key for a file: `projects/<project>/<type>/<file>__<name>`.
#[must_use]
pub fn storage_key(project_id: Uuid, file_type: &str, file_id: Uuid, original_name: &str) -> String {
    format!("projects/{project_id}/{file_type}/{file_id}__{}", sanitize_name(original_name))
}

/// Replace every character outside `[A-Za-z0-9_.\-() ]` with `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '(' | ')' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Percent-encode the way browsers' `encodeURIComponent` does.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    percent_encode(input, |b| {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
    })
}

/// Percent-encode per the AWS `SigV4` rules: only `A-Za-z0-9-_.~` pass through,
/// plus `/` when `keep_slash` is set (object key paths).
#[must_use]
pub fn aws_uri_encode(input: &str, keep_slash: bool) -> String {
    percent_encode(input, |b| {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') || (keep_slash && b == b'/')
    })
}

fn percent_encode(input: &str, keep: impl Fn(u8) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if keep(b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_layout() {
        let project = Uuid::nil();
        let file = Uuid::from_u128(1);
        let key = storage_key(project, "pdf", file, "floor plan #2.pdf");
        assert_eq!(
            key,
            "projects/00000000-0000-0000-0000-000000000000/pdf/00000000-0000-0000-0000-000000000001__floor plan _2.pdf"
        );
    }

    #[test]
    fn sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_name("A-b_c.(1) 2.png"), "A-b_c.(1) 2.png");
    }

    #[test]
    fn sanitize_replaces_separators_and_unicode() {
        assert_eq!(sanitize_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_name("plan\\é.pdf"), "plan__.pdf");
    }

    #[test]
    fn encode_uri_component_matches_browser() {
        assert_eq!(encode_uri_component("a b&c/d.pdf"), "a%20b%26c%2Fd.pdf");
        assert_eq!(encode_uri_component("it's (ok)!*~"), "it's%20(ok)!*~");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn aws_uri_encode_slash_handling() {
        assert_eq!(aws_uri_encode("a/b c", true), "a/b%20c");
        assert_eq!(aws_uri_encode("a/b c", false), "a%2Fb%20c");
        assert_eq!(aws_uri_encode("(x)", true), "%28x%29");
    }
}
