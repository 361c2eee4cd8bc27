//! Operator prompts: the backup warning gate and the site selection.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use wp_db_migrate_shared::{ExecutionMode, SiteSelection};

pub const BACKUP_WARNING: &str = "This command modifies your database in place and cannot be \
undone. Take a backup of your database and wp-config.php before you continue.";

pub const DRY_RUN_NOTICE: &str = "Running in dry run mode.";

/// Asks the operator to confirm a live run of `action`, a one line summary
/// such as "Rename the table prefix from `wp_` to `site_`.".
///
/// A dry run only prints a notice. `assume_yes` skips the prompt but still
/// prints the warning and the action. Returns `false` when the operator
/// declined.
pub fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    action: &str,
    mode: ExecutionMode,
    assume_yes: bool,
) -> io::Result<bool> {
    if mode.is_dry_run() {
        writeln!(output, "{}", DRY_RUN_NOTICE.cyan())?;
        return Ok(true);
    }

    writeln!(output, "{} {}", "Warning:".yellow().bold(), BACKUP_WARNING)?;
    writeln!(output, "{}", action.bold())?;
    if assume_yes {
        return Ok(true);
    }

    write!(output, "Are you sure you want to proceed? [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// [`confirm_with`] on stdin and stdout.
pub fn confirm(action: &str, mode: ExecutionMode, assume_yes: bool) -> io::Result<bool> {
    confirm_with(&mut io::stdin().lock(), &mut io::stdout(), action, mode, assume_yes)
}

/// Asks which site of a multisite network to merge users into, until the
/// answer parses as a site id or `all`.
///
/// Returns `None` on end of input.
pub fn prompt_site_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<SiteSelection>> {
    loop {
        write!(
            output,
            "This is a multisite network. Enter the site id to migrate users to, or `all`: "
        )?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }

        match answer.parse::<SiteSelection>() {
            Ok(selection) => return Ok(Some(selection)),
            Err(e) => writeln!(output, "{}", e.to_string().red())?,
        }
    }
}

pub fn prompt_site() -> io::Result<Option<SiteSelection>> {
    prompt_site_with(&mut io::stdin().lock(), &mut io::stdout())
}
