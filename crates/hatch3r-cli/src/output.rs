use hatch3r_core::manifest::HATCH3R_VERSION;
use hatch3r_core::writer::WriteAction;

pub fn banner() {
    println!("\n  hatch3r v{HATCH3R_VERSION}\n");
}

pub fn success(msg: &str) {
    println!("  ok: {msg}");
}

pub fn error(msg: &str) {
    println!("  error: {msg}");
}

pub fn warn(msg: &str) {
    println!("  warning: {msg}");
}

pub fn info(msg: &str) {
    println!("  {msg}");
}

pub fn step(n: usize, total: usize, msg: &str) -> String {
    format!("[{n}/{total}] {msg}")
}

pub fn label(name: &str, value: &str) -> String {
    format!("{:<12} {value}", name)
}

fn action_icon(action: &str) -> char {
    match action {
        "created" => '+',
        "updated" | "backed-up" => '~',
        "skipped" => '=',
        _ => ' ',
    }
}

/// One `+ path (created)`-style line per file touched.
pub fn print_results(results: &[(String, WriteAction)]) {
    for (path, action) in results {
        println!("  {} {path} ({action})", action_icon(action.as_str()));
    }
}

/// Plain bordered summary box.
pub fn print_box(title: &str, lines: &[String]) {
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.chars().count() + 2);
    let bar: String = "─".repeat(width + 2);
    println!("  ┌─ {title} {}", "─".repeat(width.saturating_sub(title.chars().count())));
    for line in lines {
        println!("  │ {line}");
    }
    println!("  └{bar}");
    println!();
}
