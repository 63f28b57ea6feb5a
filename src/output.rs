//! Run report rendering: human-readable summary or JSON.

use crate::types::RunReport;

pub fn print_report(report: &RunReport) {
    println!("pattern:  {}", report.pattern.as_str());
    println!("sender:   {}", report.sender);
    println!("sent:     {}", report.sent);
    println!("received: {}", report.received);

    for line in &report.responses {
        println!("  {}", line);
    }

    match &report.error {
        Some(error) => println!("error:    {} ({}ms)", error, report.elapsed_ms),
        None => println!("ok ({}ms)", report.elapsed_ms),
    }
}

pub fn print_json(report: &RunReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    println!("{}", json);
    Ok(())
}
