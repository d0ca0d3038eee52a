//! Console progress reporting
//!
//! Human-readable progress for one run: a banner, one line per card and per
//! publish, and the final two-line summary. Nothing here is machine
//! readable; structured diagnostics go through `tracing`.

use crate::crawler::ProductRecord;
use crate::output::RunSummary;
use std::io::{self, Write};

const RULE_WIDTH: usize = 50;

/// Settings shown in the run banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBanner<'a> {
    pub dry_run: bool,
    pub fetcher: &'a str,
    pub category: &'a str,
    pub limit: usize,
}

/// Writes run progress to a console-like sink
pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Reporter printing to standard output
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Reporter discarding everything
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()))
    }

    // Console output is best effort
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    pub fn banner(&mut self, banner: &RunBanner<'_>) {
        let rule = "=".repeat(RULE_WIDTH);
        self.line(&rule);
        self.line(&format!(
            "Mode: {}",
            if banner.dry_run { "DRY RUN" } else { "PRODUCTION" }
        ));
        self.line(&format!("Fetcher: {}", banner.fetcher));
        self.line(&format!("Category: {}", banner.category));
        self.line(&format!("Limit: {}", banner.limit));
        self.line(&rule);
    }

    pub fn bot_ready(&mut self, display_name: &str, id: &str) {
        self.line(&format!("Bot user: {} ({})", display_name, id));
    }

    pub fn bot_missing_dry_run(&mut self, display_name: &str) {
        self.line(&format!(
            "[DRY RUN] Bot user {} not found, would create it",
            display_name
        ));
    }

    pub fn fetching(&mut self, url: &str) {
        self.line(&format!("\nScraping: {}", url));
    }

    pub fn fetch_failed(&mut self, error: &dyn std::fmt::Display) {
        self.line(&format!("  ✗ Could not load listing: {}", error));
    }

    pub fn card_progress(&mut self, current: usize, total: usize) {
        self.line(&format!("  {}/{} - Extracting product data...", current, total));
    }

    pub fn card_extracted(&mut self, record: &ProductRecord) {
        self.line(&format!("    ✓ {} - {}", record.name, record.price));
    }

    pub fn card_skipped(&mut self, reason: &dyn std::fmt::Display) {
        self.line(&format!("    ✗ Skipped: {}", reason));
    }

    pub fn publishing(&mut self, count: usize) {
        self.line(&format!("\nCreating {} posts...", count));
    }

    pub fn dry_run_post(&mut self, record: &ProductRecord) {
        self.line(&format!(
            "  [DRY RUN] Would create post: {} - {} - {}",
            record.brand, record.name, record.price
        ));
    }

    pub fn post_created(&mut self, post_id: &str) {
        self.line(&format!("  ✓ Post created: {}", post_id));
    }

    pub fn post_failed(&mut self, record: &ProductRecord) {
        self.line(&format!("  ✗ Error creating post: {}", record.name));
    }

    pub fn no_products(&mut self) {
        self.line("\nNo products found");
    }

    pub fn summary(&mut self, summary: &RunSummary) {
        self.line("\nSummary:");
        self.line(&summary.to_string());
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Write sink readable after the reporter took ownership of it
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record() -> ProductRecord {
        ProductRecord {
            name: "Robe".to_string(),
            brand: "Mango".to_string(),
            price: "39,99 €".to_string(),
            image_url: "https://img.example/r.jpg".to_string(),
            product_url: "https://shop.example/r.html".to_string(),
            sizes: vec!["S".to_string()],
            description: "Mango - Robe".to_string(),
            category: "Vêtement".to_string(),
        }
    }

    #[test]
    fn test_dry_run_line() {
        let captured = Captured::default();
        let mut reporter = Reporter::new(Box::new(captured.clone()));
        reporter.dry_run_post(&record());
        assert_eq!(
            captured.text(),
            "  [DRY RUN] Would create post: Mango - Robe - 39,99 €\n"
        );
    }

    #[test]
    fn test_summary_lines() {
        let captured = Captured::default();
        let mut reporter = Reporter::new(Box::new(captured.clone()));
        reporter.summary(&RunSummary {
            succeeded: 4,
            failed: 1,
        });
        assert!(captured.text().ends_with("  Success: 4\n  Errors: 1\n"));
    }

    #[test]
    fn test_banner_mode() {
        let captured = Captured::default();
        let mut reporter = Reporter::new(Box::new(captured.clone()));
        reporter.banner(&RunBanner {
            dry_run: true,
            fetcher: "static",
            category: "mode-femme",
            limit: 5,
        });
        let text = captured.text();
        assert!(text.contains("Mode: DRY RUN"));
        assert!(text.contains("Category: mode-femme"));
        assert!(text.contains("Limit: 5"));
    }

    #[test]
    fn test_no_products() {
        let captured = Captured::default();
        let mut reporter = Reporter::new(Box::new(captured.clone()));
        reporter.no_products();
        assert_eq!(captured.text(), "\nNo products found\n");
    }
}
