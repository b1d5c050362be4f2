use chrono::{DateTime, Local};

/// Prints a timestamped progress line to stdout for whoever is watching the run.
/// Passing a start time as the first argument appends how long it has been since then.
/// ```
/// use chrono::Local;
/// use bookscrap::info_time;
///
/// info_time!("Scraping page {} of {}", 1, 100);
/// let started = Local::now();
/// info_time!(started, "Scraping complete. Data saved to: {}", "data/out.csv");
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        println!("{}", $crate::macros::stamp(&format!($strfm, $($arg),*)));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let line = $crate::macros::stamp(&format!($strfm, $($arg),*));
        println!("{} ({:.3} sec)", line, $crate::macros::secs_since($time));
    }};
}

#[doc(hidden)]
pub fn stamp(msg: &str) -> String {
    format!("{:<30} : {}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"), msg)
}

#[doc(hidden)]
pub fn secs_since(start: DateTime<Local>) -> f64 {
    (Local::now() - start)
        .num_microseconds()
        .map(|n| n as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}
