/// Turns a caller path into the share-relative form CREATE expects.
///
/// `/` and `\` both separate components. Empty and `.` components are
/// dropped and `..` pops the previous one, stopping at the share root. The
/// result is joined with `\` and has no leading separator, so the share root
/// itself is the empty string.
pub fn normalize_path(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            name => components.push(name),
        }
    }
    components.join("\\")
}

/// The UNC path of `share` on `host`.
pub fn unc_path(host: &str, share: &str) -> String {
    format!("\\\\{}\\{}", host, share.trim_matches(['/', '\\']))
}

/// The last component of a normalized path, empty for the share root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or_default()
}
