/// console logging bootstrap for binaries and tests that want the library's
/// log output.  libraries only call the log macros; wiring an appender is the
/// application's job, and this saves each one rebuilding the same config.
///
use anyhow::Result;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// install a console logger at info level
pub fn init() -> Result<()> {
    init_with_level(LevelFilter::Info)
}

/// install a console logger at the given level; errors if a logger is
/// already installed
pub fn init_with_level(level: LevelFilter) -> Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;

    log4rs::init_config(config)?;

    Ok(())
}
