//! Package listing output parsing

/// Prefix `pm list packages` puts before every identifier
pub const PACKAGE_PREFIX: &str = "package:";

/// Parse the output of `pm list packages`.
///
/// One identifier per line, each prefixed with `package:`. Blank lines are
/// dropped; lines without the prefix are kept as-is.
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix(PACKAGE_PREFIX).unwrap_or(line).trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
