use bci_rs::StreamDescriptor;
use std::io::Write;

/// Write a line of JSON to stdout.
pub fn write_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(json.as_bytes())
        .and_then(|_| handle.write_all(b"\n"))
        .map_err(|e| format!("Failed to write to stdout: {}", e))
}

/// Fixed-width table of stream descriptors.
pub fn stream_table(streams: &[StreamDescriptor]) -> String {
    let name_width = streams
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut table = format!(
        "{:<name_width$}  {:<10}  {:>8}  {:>8}  {}\n",
        "NAME",
        "TYPE",
        "CHANNELS",
        "RATE",
        "SOURCE",
        name_width = name_width
    );
    for s in streams {
        let rate = if s.is_irregular() {
            "irregular".to_string()
        } else {
            format!("{:.1}", s.nominal_srate)
        };
        table.push_str(&format!(
            "{:<name_width$}  {:<10}  {:>8}  {:>8}  {}\n",
            s.name,
            s.stream_type,
            s.channel_count,
            rate,
            s.source_id,
            name_width = name_width
        ));
    }
    table
}

/// `[0.000, 1.000, ...]` with three decimals per value.
pub fn format_values(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.3}", v)).collect();
    format!("[{}]", parts.join(", "))
}
