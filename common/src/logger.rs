use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use chrono::Local;

static LOGGER: OnceLock<Logger> = OnceLock::new();

enum Sink {
    Stdout,
    // The client owns the terminal in raw mode, so its lines go to a file.
    File(Mutex<File>),
}

pub struct Logger {
    prefix: Option<String>,
    sink: Sink,
}

impl Logger {
    fn new(prefix: Option<String>, sink: Sink) -> Self {
        Self { prefix, sink }
    }

    fn format_line(&self, file: &str, line: u32, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        match &self.prefix {
            Some(prefix) => format!("[{}][{}][{}:{}] {}", timestamp, prefix, file_name, line, message),
            None => format!("[{}][{}:{}] {}", timestamp, file_name, line, message),
        }
    }

    pub fn log(&self, file: &str, line: u32, message: &str) {
        let formatted = self.format_line(file, line, message);
        match &self.sink {
            Sink::Stdout => println!("{}", formatted),
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{}", formatted);
                }
            }
        }
    }
}

pub fn init_logger(prefix: Option<String>) {
    LOGGER.get_or_init(|| Logger::new(prefix, Sink::Stdout));
}

pub fn init_file_logger(prefix: Option<String>, path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    LOGGER.get_or_init(|| Logger::new(prefix, Sink::File(Mutex::new(file))));
    Ok(())
}

pub fn log(file: &str, line: u32, message: &str) {
    // Tests exercise code paths that log without ever installing a logger.
    if let Some(logger) = LOGGER.get() {
        logger.log(file, line, message);
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logger::log(file!(), line!(), &format!($($arg)*))
    };
}
