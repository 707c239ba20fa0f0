//! Builds the `export` prefix statement from environment entries

use tracing::{debug, warn};

use crate::config::{EnvEntry, ExportPolicy};

/// Entries allowed by `policy`, in their original order
pub fn filter_entries<'a>(entries: &'a [EnvEntry], policy: &ExportPolicy) -> Vec<&'a EnvEntry> {
    if policy.export_action_options {
        return entries.iter().collect();
    }

    let denylist: Vec<String> = policy.denylist.iter().map(|d| d.to_lowercase()).collect();

    entries
        .iter()
        .filter(|entry| {
            let key = entry.key.to_lowercase();
            let ignored = denylist.iter().any(|d| key.contains(d.as_str()));
            if ignored {
                debug!(key = %entry.key, "not exporting action option");
            }
            !ignored
        })
        .collect()
}

/// Build `export KEY="VALUE" ...` for the entries allowed by `policy`
///
/// Values are wrapped in double quotes verbatim. Embedded quotes, `$` and backticks
/// are not escaped and will be interpreted by the remote shell.
pub fn build_export_statement(entries: &[EnvEntry], policy: &ExportPolicy) -> String {
    let mut statement = String::from("export");

    for entry in filter_entries(entries, policy) {
        if entry.value.contains('"') {
            warn!(key = %entry.key, "exported value contains a double quote and is not escaped");
        }
        statement.push(' ');
        statement.push_str(&entry.key);
        statement.push_str("=\"");
        statement.push_str(&entry.value);
        statement.push('"');
    }

    statement
}
