use colored::*;
use console::Term;
use std::fmt::Display;

/// Console output with the taskdeck colors.
/// Teal (38, 166, 154) for info and highlights, amber (245, 166, 35) for headings.
/// Namespace only, never instantiated.
pub struct Logger;

impl Logger {
    /// Prints the greeting banner, centered on the terminal.
    pub fn banner(name: &str) {
        let term = Term::stdout();
        let width = term.size().1 as usize;

        let title = format!("taskdeck · welcome, {}", name);
        println!(
            "{:^width$}",
            title.truecolor(245, 166, 35).bold().to_string(),
            width = width
        );
        println!();
    }

    /// General information.
    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "•".truecolor(38, 166, 154).bold(), msg);
    }

    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "✔".green().bold(), msg);
    }

    /// Goes to stderr so piping a table somewhere still shows failures.
    pub fn error<T: Display>(msg: T) {
        eprintln!("{} {}", "✖".red().bold(), msg);
    }

    pub fn warn<T: Display>(msg: T) {
        println!("{} {}", "⚠".yellow().bold(), msg);
    }

    /// Section header. The leading newline keeps it off the previous output.
    pub fn header<T: Display>(msg: T) {
        println!(
            "\n{}",
            msg.to_string().truecolor(245, 166, 35).bold().underline()
        );
    }

    /// Inline teal, for names and ids inside a sentence.
    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(38, 166, 154).bold().to_string()
    }

    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }
}
