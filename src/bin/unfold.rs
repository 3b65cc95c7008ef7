use anyhow::{Context, Result, anyhow};

use pn_unfold::config::UnfoldConfig;
use pn_unfold::net::read_net;
use pn_unfold::options::Options;
use pn_unfold::unfold::{StopReason, Unfolder, write_mci};

fn main() {
    if std::env::var("UNFOLD_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("UNFOLD_LOG")
            .write_style("UNFOLD_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // flags from the environment come first so the command line can override them
    let mut flags = shellwords::split(&std::env::var("UNFOLD_FLAGS").unwrap_or_default())
        .map_err(|e| anyhow!("invalid UNFOLD_FLAGS: {}", e))?;
    for (i, arg) in std::env::args_os().enumerate().skip(1) {
        let arg = arg
            .into_string()
            .map_err(|arg| anyhow!("Argument {i} is not valid Unicode: {arg:?}"))?;
        flags.push(arg);
    }
    let options = Options::parse_from_args(&flags).map_err(|e| anyhow!("{}", e))?;
    log::debug!("unfold options: {:?}", options);

    let net = read_net(&options.net)
        .with_context(|| format!("Failed to load net {:?}", options.net))?;
    net.log_diagnostics();

    let file_config = match &options.config {
        Some(path) => UnfoldConfig::load_from_file(path)?,
        None => UnfoldConfig::default(),
    };
    let settings = file_config.merge(options.overrides.clone()).resolve(&net)?;

    let result = Unfolder::new(&net, settings).run();
    let stats = &result.stats;

    if let Some(path) = &options.mci {
        write_mci(path, &net, &result.unfolding)
            .with_context(|| format!("Failed to write {:?}", path))?;
        log::info!("wrote {:?}", path);
    }

    let stop = match stats.stop {
        StopReason::QueueExhausted => "queue exhausted".to_owned(),
        StopReason::TargetFired(event) => format!("target fired as {}", event),
        StopReason::EventBudget => "event budget reached".to_owned(),
    };
    println!(
        "{} conditions, {} events, {} extensions queued, {} dropped by depth; {}",
        stats.conditions,
        stats.events,
        stats.engine.queued,
        stats.engine.dropped_depth,
        stop
    );
    Ok(())
}
