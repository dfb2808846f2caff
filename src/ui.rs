//! Human-readable report output

use colored::Colorize;

/// Print a line for a resource that changed (or would change)
pub fn changed(msg: &str) {
    println!("{} {}", "~".yellow().bold(), msg);
}

/// Print a line for a resource already in the desired state
pub fn ok(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a failure
pub fn failed(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a line-oriented diff between two texts
pub fn diff(before_header: &str, after_header: &str, before: &str, after: &str) {
    println!("  {}", format!("--- {before_header}").red());
    println!("  {}", format!("+++ {after_header}").green());

    let diff = similar::TextDiff::from_lines(before, after);
    let mut has_changes = false;

    for change in diff.iter_all_changes() {
        let line = change.to_string();
        let line = line.trim_end_matches('\n');
        match change.tag() {
            similar::ChangeTag::Delete => {
                has_changes = true;
                println!("  {}", format!("-{line}").red());
            }
            similar::ChangeTag::Insert => {
                has_changes = true;
                println!("  {}", format!("+{line}").green());
            }
            similar::ChangeTag::Equal => {}
        }
    }

    if !has_changes {
        dim("(content is identical)");
    }
}

const KB: u64 = 1024;
const MB: u64 = KB * 1024;

/// Format a byte count for display, exact below 1 KB
pub fn format_size(bytes: u64) -> String {
    if bytes >= MB {
        format!("{:.1} MB ({bytes} bytes)", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB ({bytes} bytes)", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_small() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(5), "5 bytes");
        assert_eq!(format_size(1023), "1023 bytes");
    }

    #[test]
    fn test_format_size_larger() {
        assert_eq!(format_size(1536), "1.5 KB (1536 bytes)");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB (2097152 bytes)");
    }
}
