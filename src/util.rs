//! Small pure helpers shared across the UI and controller layers.

/// Uppercase the first character of `s`, leaving the rest untouched.
///
/// Used for the OS line in the status pane ("linux" -> "Linux").
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Current wall-clock time in the local timezone, formatted as "HH:MM:SS".
///
/// Stamped into the "Last updated" line after every successful status fetch.
pub fn now_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Current local date and time, "YYYY-MM-DD HH:MM:SS", used by the log timer.
pub fn now_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
