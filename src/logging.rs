// Console logging for both binaries. `RUST_LOG` still wins if set.

use env_logger::Env;

pub fn init() {
    // A second call (tests, embedding) is harmless.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
