use env_logger::Env;

/// Log filter comes from `GESTURECTL_LOG`, defaulting to `info`.
pub fn init() {
    env_logger::Builder::from_env(Env::new().filter_or("GESTURECTL_LOG", "info"))
        .format_timestamp_millis()
        .init();
}
