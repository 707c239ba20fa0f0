//! Joins the export prefix and user commands into one remote statement

/// Separator placed between statements
pub const STATEMENT_SEPARATOR: &str = ";";

/// Prepend `export_statement` to `commands` and join everything with `;`
///
/// The caller's slice is left untouched. No commands yields just the prefix.
pub fn assemble(export_statement: &str, commands: &[String]) -> String {
    std::iter::once(export_statement)
        .chain(commands.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_comes_first() {
        let commands = vec!["echo hi".to_string(), "uname -a".to_string()];
        let statement = assemble(r#"export FOO="1""#, &commands);
        assert_eq!(statement, r#"export FOO="1";echo hi;uname -a"#);

        let mut parts = statement.split(STATEMENT_SEPARATOR);
        assert_eq!(parts.next(), Some(r#"export FOO="1""#));
        assert_eq!(parts.collect::<Vec<_>>(), vec!["echo hi", "uname -a"]);
    }

    #[test]
    fn test_commands_not_mutated() {
        let commands = vec!["ls".to_string()];
        let _ = assemble("export", &commands);
        assert_eq!(commands, vec!["ls".to_string()]);
    }

    #[test]
    fn test_no_commands() {
        assert_eq!(assemble("export A=\"1\"", &[]), "export A=\"1\"");
    }
}
