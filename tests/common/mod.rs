#![allow(dead_code)]

use payment_sim::application::processor::CommandProcessor;
use payment_sim::domain::amount::Amount;
use payment_sim::error::Result;
use payment_sim::infrastructure::in_memory::InMemoryPaymentRepository;
use payment_sim::interfaces::text::command_parser::parse_line;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn processor(threshold: Option<&str>) -> CommandProcessor {
    let threshold = threshold.map(|t| Amount::parse(t).unwrap());
    CommandProcessor::new(Box::new(InMemoryPaymentRepository::new()), threshold)
}

/// Parses and executes one line, the way the read loop does.
pub async fn exec(processor: &CommandProcessor, line: &str) -> Result<String> {
    let command = parse_line(line)?;
    processor.execute(&command).await
}

/// Executes every line, panicking on the first failure.
pub async fn exec_all(processor: &CommandProcessor, lines: &[&str]) {
    for line in lines {
        if let Err(e) = exec(processor, line).await {
            panic!("{line:?} failed: {e}");
        }
    }
}

pub fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}
