use clap::Parser;
use cnc::config::{load_config, paths};
use cnc::core::select;
use cnc::utils::{logger, validation::Validate};
use cnc::{CliConfig, CncSession, HostStatus, Result, SystemRunner};
use std::io;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliConfig::parse();

    logger::init_cli_logger(args.verbose);
    tracing::debug!("CLI config: {:?}", args);

    let exit_code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "{} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(args: CliConfig) -> Result<i32> {
    args.validate()?;

    let config_path = paths::resolve_config_path(args.config.as_deref())?;
    tracing::info!("Loading configuration from {}", config_path.display());
    let config = load_config(&config_path)?;

    let session = CncSession::new(SystemRunner, config);

    if args.list {
        print_host_list(&session, &args).await?;
        return Ok(0);
    }

    let host = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        select::resolve_host(session.config(), args.host.as_deref(), &mut input, &mut output)?
    };

    let outcome = session.run(host, &args.session_options()).await?;
    tracing::debug!("outcome: {:?}", outcome);

    if args.status {
        let state = if outcome.exit_code() == 0 { "🟢 online" } else { "🔴 offline" };
        if !args.dry_run {
            println!("{} is {}", host.name, state);
        }
    }

    Ok(outcome.exit_code())
}

async fn print_host_list(session: &CncSession<SystemRunner>, args: &CliConfig) -> Result<()> {
    let config = session.config();
    let default = config.default_host().map(|h| h.name.as_str());

    println!("📋 Configured hosts:");
    if args.dry_run {
        for host in config.hosts() {
            print_host_line(host, default, None);
        }
        return Ok(());
    }

    for (host, status) in session.host_statuses(args.probe_timeout).await? {
        print_host_line(host, default, Some(&status));
    }
    Ok(())
}

fn print_host_line(host: &cnc::Host, default: Option<&str>, status: Option<&HostStatus>) {
    let marker = if default == Some(host.name.as_str()) { "*" } else { " " };
    let status = match status {
        Some(HostStatus::Online) => "🟢 online".to_string(),
        Some(HostStatus::Offline) => "🔴 offline".to_string(),
        Some(HostStatus::Unreachable { proxy, .. }) => format!("⚠️  {} unreachable", proxy),
        None => String::new(),
    };
    println!(
        "{} {:<16} {}  via {:<12} {}",
        marker, host.name, host.mac, host.proxy, status
    );
}
