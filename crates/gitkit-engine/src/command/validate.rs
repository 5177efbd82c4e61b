//! Argument vector validation
//!
//! Runs before every spawn. Checks are applied as whole-vector passes in a
//! fixed order so the reported failure is deterministic:
//!
//! 1. shell metacharacters in any argument
//! 2. flags outside the allow-list
//! 3. `..` segments in path-like arguments
//! 4. caller-supplied values that would be parsed as options

use gitkit_session::has_traversal;

use super::{Arg, CommandLine};
use crate::{Error, Result};

/// Characters rejected anywhere in an argument.
pub const SHELL_METACHARACTERS: [char; 7] = [';', '&', '|', '`', '$', '<', '>'];

/// Long flags the engine may emit, with or without an inline `=value`.
const ALLOWED_LONG_FLAGS: &[&str] = &[
    "--abort",
    "--all",
    "--allow-empty",
    "--amend",
    "--author",
    "--bare",
    "--branch",
    "--cached",
    "--date",
    "--ff-only",
    "--force",
    "--force-with-lease",
    "--format",
    "--include-untracked",
    "--initial-branch",
    "--keep-index",
    "--list",
    "--max-count",
    "--mixed",
    "--no-decorate",
    "--no-edit",
    "--no-ext-diff",
    "--no-ff",
    "--no-gpg-sign",
    "--no-rebase",
    "--no-verify",
    "--numstat",
    "--porcelain",
    "--prune",
    "--rebase",
    "--set-upstream",
    "--since",
    "--soft",
    "--hard",
    "--squash",
    "--stat",
    "--tags",
    "--untracked-files",
    "--verbose",
];

/// Whether `flag` may appear in an argument vector.
///
/// Single-letter short flags (`-b`, `-S`) are always accepted. Long flags
/// must be on the allow-list; `--name=value` is checked by its `--name`.
pub fn is_allowed_flag(flag: &str) -> bool {
    if let Some(short) = flag.strip_prefix('-')
        && !short.starts_with('-')
    {
        let mut chars = short.chars();
        return matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic());
    }
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    ALLOWED_LONG_FLAGS.contains(&name)
}

fn check_metacharacters(argument: &str) -> Result<()> {
    match argument.chars().find(|c| SHELL_METACHARACTERS.contains(c)) {
        Some(character) => Err(Error::UnsafeArgument {
            argument: argument.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

fn check_flag(flag: &str) -> Result<()> {
    if is_allowed_flag(flag) {
        Ok(())
    } else {
        Err(Error::DisallowedFlag {
            flag: flag.to_string(),
        })
    }
}

fn check_traversal(path: &str) -> Result<()> {
    if has_traversal(path) {
        Err(Error::PathTraversal {
            path: path.to_string(),
        })
    } else {
        Ok(())
    }
}

fn check_not_option(value: &str) -> Result<()> {
    if value.starts_with('-') {
        Err(Error::OptionInjection {
            value: value.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a typed command line.
pub fn validate(command: &CommandLine) -> Result<()> {
    for arg in &command.args {
        check_metacharacters(arg.as_str())?;
    }

    for arg in &command.args {
        if let Arg::Flag(flag) = arg {
            check_flag(flag)?;
        }
    }

    for arg in &command.args {
        if let Arg::Path(value) | Arg::Positional(value) = arg {
            check_traversal(value)?;
        }
    }

    let mut options_ended = false;
    for arg in &command.args {
        match arg {
            Arg::Separator => options_ended = true,
            Arg::Positional(value) => check_not_option(value)?,
            Arg::Path(value) if !options_ended => check_not_option(value)?,
            _ => {}
        }
    }

    Ok(())
}

/// Validate a raw argument vector.
///
/// Without provenance every dashed argument before `--` is treated as a
/// flag and every other argument as path-like.
pub fn validate_argv(argv: &[String]) -> Result<()> {
    for arg in argv {
        check_metacharacters(arg)?;
    }

    let separator = argv.iter().position(|a| a == "--").unwrap_or(argv.len());
    for arg in &argv[..separator] {
        if arg.starts_with('-') {
            check_flag(arg)?;
        }
    }

    for arg in argv.iter().filter(|a| !a.starts_with('-')) {
        check_traversal(arg)?;
    }
    for arg in &argv[separator..] {
        check_traversal(arg)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use proptest::prelude::*;
    use rstest::rstest;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("-b")]
    #[case("-S")]
    #[case("--porcelain=v2")]
    #[case("--format=%H%x1f%s")]
    #[case("--no-gpg-sign")]
    #[case("--max-count=10")]
    fn test_allowed_flags(#[case] flag: &str) {
        assert!(is_allowed_flag(flag), "{flag} should be allowed");
    }

    #[rstest]
    #[case("--upload-pack=evil")]
    #[case("--exec")]
    #[case("-xyz")]
    #[case("--output=/tmp/x")]
    #[case("-1")]
    fn test_disallowed_flags(#[case] flag: &str) {
        assert!(!is_allowed_flag(flag), "{flag} should be rejected");
    }

    #[rstest]
    #[case(&["status", "--porcelain=v2", "--branch"])]
    #[case(&["log", "--max-count=5", "main..feature"])]
    #[case(&["add", "--", "src/lib.rs", "docs/a b.md"])]
    #[case(&["commit", "-m", "fix: handle (edge) cases"])]
    fn test_validate_argv_accepts(#[case] args: &[&str]) {
        validate_argv(&argv(args)).unwrap();
    }

    #[test]
    fn test_validate_argv_rejects_metacharacter() {
        let err = validate_argv(&argv(&["log", "main;rm -rf /"])).unwrap_err();
        assert!(matches!(err, Error::UnsafeArgument { character: ';', .. }));
    }

    #[test]
    fn test_validate_argv_rejects_unknown_flag() {
        let err = validate_argv(&argv(&["fetch", "--upload-pack=touch"])).unwrap_err();
        assert!(matches!(err, Error::DisallowedFlag { flag } if flag == "--upload-pack=touch"));
    }

    #[test]
    fn test_validate_argv_rejects_traversal_after_separator() {
        let err = validate_argv(&argv(&["add", "--", "../outside"])).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[test]
    fn test_metacharacter_checked_before_flag() {
        let err = validate_argv(&argv(&["log", "--exec", "a|b"])).unwrap_err();
        assert!(matches!(err, Error::UnsafeArgument { character: '|', .. }));
    }

    #[test]
    fn test_validate_rejects_option_like_positional() {
        let mut cmd = CommandLine::new(OperationKind::Checkout);
        cmd.word("checkout").positional("--orphan");
        let err = validate(&cmd).unwrap_err();
        assert!(matches!(err, Error::OptionInjection { value } if value == "--orphan"));
    }

    #[test]
    fn test_validate_allows_dashed_path_after_separator() {
        let mut cmd = CommandLine::new(OperationKind::Add);
        cmd.word("add").pathspec(&["-weird-name.txt".to_string()]);
        validate(&cmd).unwrap();
    }

    #[test]
    fn test_validate_rejects_dashed_path_before_separator() {
        let mut cmd = CommandLine::new(OperationKind::Worktree);
        cmd.word("worktree").word("remove").path("-f");
        assert!(matches!(validate(&cmd), Err(Error::OptionInjection { .. })));
    }

    #[test]
    fn test_validate_allows_dashed_value() {
        let mut cmd = CommandLine::new(OperationKind::Commit);
        cmd.word("commit").option("-m", "- bullet one");
        validate(&cmd).unwrap();
    }

    #[test]
    fn test_validate_rejects_traversal_in_path() {
        let mut cmd = CommandLine::new(OperationKind::Worktree);
        cmd.word("worktree").word("add").path("/repos/../etc");
        assert!(matches!(validate(&cmd), Err(Error::PathTraversal { .. })));
    }

    proptest! {
        #[test]
        fn prop_any_metacharacter_is_rejected(
            prefix in "[a-zA-Z0-9/._-]{0,12}",
            suffix in "[a-zA-Z0-9/._-]{0,12}",
            index in 0usize..SHELL_METACHARACTERS.len(),
        ) {
            let bad = SHELL_METACHARACTERS[index];
            let arg = format!("{prefix}{bad}{suffix}");
            let err = validate_argv(&["log".to_string(), arg]).unwrap_err();
            let is_unsafe = matches!(err, Error::UnsafeArgument { character, .. } if character == bad);
            prop_assert!(is_unsafe);
        }

        #[test]
        fn prop_plain_refs_are_accepted(name in "[a-zA-Z0-9_][a-zA-Z0-9/_.]{0,30}") {
            prop_assume!(!has_traversal(&name));
            let mut cmd = CommandLine::new(OperationKind::Log);
            cmd.word("log").positional(name);
            prop_assert!(validate(&cmd).is_ok());
        }
    }
}
