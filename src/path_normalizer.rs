// Path template canonicalization. Two templates are considered equivalent
// iff their normalized forms are identical strings.

/// Normalizes a path template into a comparable canonical form:
/// version segments (`v` followed by digits, e.g. `/v1/`) are deleted and
/// every brace-delimited parameter segment (e.g. `{id}`, `{userId}`) becomes
/// the literal token `{param}`.
///
/// Pure and total; idempotent by construction.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/') {
        if segment.is_empty() || is_version_segment(segment) {
            continue;
        }
        out.push('/');
        if is_parameter_segment(segment) {
            out.push_str("{param}");
        } else {
            out.push_str(segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// `v` followed by one or more ASCII digits, nothing else.
fn is_version_segment(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn is_parameter_segment(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}
