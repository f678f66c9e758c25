use crate::domain::model::{CncConfig, Host};
use crate::utils::error::{CncError, Result};
use std::io::{BufRead, Write};

/// Picks the target: the requested name, then `default_host`, then the menu.
pub fn resolve_host<'a, R, W>(
    config: &'a CncConfig,
    requested: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<&'a Host>
where
    R: BufRead,
    W: Write,
{
    if let Some(name) = requested {
        return config.require_host(name);
    }

    if let Some(host) = config.default_host() {
        tracing::debug!("using default host {}", host.name);
        return Ok(host);
    }

    prompt_for_host(config.hosts(), input, output)
}

/// Numbered menu on `output`, answers read from `input` until one is valid.
/// A single host is picked without asking.
pub fn prompt_for_host<'a, R, W>(hosts: &'a [Host], input: &mut R, output: &mut W) -> Result<&'a Host>
where
    R: BufRead,
    W: Write,
{
    if let [only] = hosts {
        return Ok(only);
    }

    writeln!(output, "Select the high-power host to wake up:")?;
    for (i, host) in hosts.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, host.name)?;
    }

    // Raw bytes: a line that is not UTF-8 is just another invalid answer.
    let mut line = Vec::new();
    loop {
        write!(output, "Enter your choice (number): ")?;
        output.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(output)?;
            return Err(CncError::InputAborted);
        }

        let choice = std::str::from_utf8(&line)
            .ok()
            .and_then(|text| text.trim().parse::<usize>().ok());
        match choice {
            Some(choice) if (1..=hosts.len()).contains(&choice) => return Ok(&hosts[choice - 1]),
            _ => writeln!(output, "Invalid choice. Please try again.")?,
        }
    }
}
