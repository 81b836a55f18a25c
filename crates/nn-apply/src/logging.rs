use colored::{Colorize, CustomColor};

const APP_NAME: &str = "nn-apply";

pub const ACCENT: CustomColor = CustomColor {
    r: 32,
    g: 148,
    b: 243,
};

/// Route `log` records to stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    // No-op when a logger is already installed.
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub fn print_err(err_message: &str) {
    eprintln!(
        "[{}] {}: {}",
        APP_NAME.custom_color(ACCENT),
        "error".red().bold(),
        err_message
    );
}

#[macro_export]
macro_rules! print_err {
    ($($arg:tt)*) => {
        $crate::logging::print_err(&format!($($arg)*));
    };
}

pub fn print_warn(warn_message: &str) {
    eprintln!(
        "[{}] {}: {}",
        APP_NAME.custom_color(ACCENT),
        "warning".yellow().bold(),
        warn_message
    );
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::logging::print_warn(&format!($($arg)*));
    };
}

pub fn print_info(info_message: &str) {
    eprintln!(
        "[{}] {}: {}",
        APP_NAME.custom_color(ACCENT),
        "info".cyan().bold(),
        info_message
    );
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::logging::print_info(&format!($($arg)*));
    };
}
