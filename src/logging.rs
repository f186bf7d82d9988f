/// Initialize env_logger for a command-line tool.
///
/// Defaults to `warn` so a tool's stdout report is the only output unless
/// `RUST_LOG` asks for more.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    if let Err(e) = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
    {
        log::debug!("[logging] env_logger already initialized: {}", e);
    }
}
