use crate::domain::model::SshTarget;
use crate::domain::ports::CommandLine;

pub const SSH_PROGRAM: &str = "ssh";

/// `ssh` exits 255 when it fails itself, as opposed to relaying the remote
/// command's status.
pub const SSH_FAILURE_STATUS: i32 = 255;

/// `ssh [-p PORT]`. An unset port leaves `~/.ssh/config` in charge.
fn base(target: &SshTarget) -> CommandLine {
    let cmd = CommandLine::new(SSH_PROGRAM);
    match target.port {
        Some(port) => cmd.arg("-p").arg(port.to_string()),
        None => cmd,
    }
}

/// Runs `remote` on `target`.
pub fn remote<I>(target: &SshTarget, remote: I) -> CommandLine
where
    I: IntoIterator<Item = String>,
{
    base(target).arg(target.destination()).args(remote)
}

/// Opens a login session on `target`. `extra` goes before the destination so
/// it is read as `ssh` options.
pub fn session(target: &SshTarget, extra: &[String]) -> CommandLine {
    base(target)
        .args(extra.iter().cloned())
        .arg(target.destination())
}
