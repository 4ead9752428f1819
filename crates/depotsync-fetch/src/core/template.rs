/// Substitute `{repo}`, `{sha}` and `{path}` into a mirror template.
///
/// Substituted values are not scanned again, so a path containing a literal
/// `{sha}` is left alone.
pub fn render_template(template: &str, repo: &str, sha: &str, path: &str) -> String {
    let mut out = String::with_capacity(template.len() + repo.len() + sha.len() + path.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let (value, consumed) = if tail.starts_with("{repo}") {
            (repo, "{repo}".len())
        } else if tail.starts_with("{sha}") {
            (sha, "{sha}".len())
        } else if tail.starts_with("{path}") {
            (path, "{path}".len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    out
}
