use colored::Colorize;

use crate::core::results::{ScanResult, VerificationStatus};

/// Terminal output helpers for the binary.
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn print_banner() {
        println!("{}", "leakscan".bright_cyan().bold());
        println!("{}", "credential leak detection and verification".dimmed());
        println!();
    }

    pub fn print_ethical_warning() {
        println!(
            "{}",
            "Only verify credentials you are authorized to test. Verification \
             sends each candidate to its issuing service."
                .yellow()
        );
        println!();
    }

    pub fn print_error(msg: &str) {
        eprintln!("{} {}", "✗".red().bold(), msg.red());
    }

    pub fn print_success(msg: &str) {
        println!("{} {}", "✓".green().bold(), msg);
    }

    pub fn print_info(msg: &str) {
        println!("{} {}", "•".bright_yellow(), msg);
    }

    pub fn print_result(result: &ScanResult) {
        let status = match result.status {
            VerificationStatus::Verified => "VERIFIED".green().bold(),
            VerificationStatus::Rejected => "rejected".red(),
            VerificationStatus::Indeterminate => "indeterminate".yellow(),
            VerificationStatus::Unverified => "found".normal(),
        };

        println!(
            "  [{}] {} {}",
            result.kind.to_string().bright_cyan(),
            status,
            result.redacted.bright_white()
        );

        if let Some(error) = &result.error {
            println!("      {}", error.dimmed());
        }
        for (key, value) in &result.extra_data {
            println!("      {}: {}", key.bright_cyan(), value);
        }
    }
}
