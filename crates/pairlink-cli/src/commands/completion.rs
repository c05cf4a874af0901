use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Write the completion script for `shell` to `out`
pub fn execute(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairlink_command() -> Command {
        Command::new("pairlink")
            .subcommand(Command::new("connect"))
            .subcommand(Command::new("session"))
    }

    #[test]
    fn test_script_names_binary_and_subcommands() {
        let mut out = Vec::new();

        execute(Shell::Bash, &mut pairlink_command(), &mut out).unwrap();

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("pairlink"));
        assert!(script.contains("connect"));
        assert!(script.contains("session"));
    }
}
