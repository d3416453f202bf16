use crate::app::cli::api::{load_config_file, Args, HostConfig};
use crate::app::display::print_module_table;
use crate::app::host::{build_services, HostRuntime};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::core::version::{build_time, git_hash, host_module_name, host_version};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;

fn parse_args() -> Args {
    let styled = std::io::stdout().is_terminal();
    let matches = Args::command().styles(palette_to_clap(styled)).get_matches();
    match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    }
}

/// Run the host once: start, report, shut down
pub async fn startup() {
    let args = parse_args();

    let table = match load_config_file(args.config_file.as_deref()).await {
        Ok(table) => table,
        Err(e) => fatal(&e, "Failed to load configuration"),
    };
    let config = match HostConfig::resolve(&args, table.as_ref()) {
        Ok(config) => config,
        Err(e) => fatal(&e, "Invalid configuration"),
    };
    let use_color = config.use_color();

    let log_file = config.log_file.as_ref().map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        Some(&config.log_level),
        Some(&config.log_format),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    log::info!(
        "{} {} ({}, built {})",
        host_module_name(),
        host_version(),
        git_hash(),
        build_time()
    );
    log::debug!("Configuration: {:#?}", config);

    let services = match build_services(config.source_settings(), config.obsolete.clone()) {
        Ok(services) => services,
        Err(e) => fatal(&e, "Failed to initialise host services"),
    };

    let runtime = match HostRuntime::boot(services) {
        Ok(runtime) => runtime,
        Err(e) => fatal(&e, "Failed to start host"),
    };

    print_module_table(runtime.services().modules(), runtime.report(), use_color);

    if let Err(e) = runtime.shutdown() {
        fatal(&e, "Failed to shut down cleanly");
    }
}

fn fatal<E: crate::core::error_handling::ContextualError + std::fmt::Debug>(
    error: &E,
    context: &str,
) -> ! {
    // logging may not be up yet
    if !log::log_enabled!(log::Level::Error) {
        eprintln!("{}", error.user_message().unwrap_or_else(|| context.to_string()));
    }
    log_error_with_context(error, context);
    std::process::exit(1);
}
