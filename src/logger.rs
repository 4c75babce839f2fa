use std::io::Write;

static LOGGER: Logger = Logger;

/// Console backend for the `log` facade. Each line carries a local timestamp
/// and the emitting thread, so worker output can be told apart from the
/// simulation thread. Warnings and errors go to stderr.
pub struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let thread = std::thread::current();
        let line = format_line(
            &chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            thread.name().unwrap_or("unnamed"),
            record,
        );

        if record.level() <= log::Level::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

fn format_line(timestamp: &str, thread: &str, record: &log::Record) -> String {
    format!(
        "[{}] [{} @ {} > {:?}] {}",
        timestamp,
        record.target(),
        thread,
        record.level(),
        record.args()
    )
}

/// Installs the crate logger as the global `log` backend. Fails if another
/// logger was installed first.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);

    Ok(())
}
