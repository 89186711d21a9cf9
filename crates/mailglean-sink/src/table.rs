use mailglean_core::MessageExtraction;

/// Rectangular view of an aggregated batch, ready for tabular output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Two-pass shaping: first compute per-field maxima across the batch, then
/// pad every row with empty cells up to those maxima. Pure; the I/O sink
/// decides where the table goes.
pub fn shape_batch(batch: &[MessageExtraction]) -> BatchTable {
    let max_names = field_max(batch, |result| result.names.len());
    let max_emails = field_max(batch, |result| result.emails.len());
    let max_addresses = field_max(batch, |result| result.addresses.len());
    let max_phones = field_max(batch, |result| result.phones.len());

    let mut headers = Vec::with_capacity(max_names + max_emails + max_addresses + max_phones);
    extend_headers(&mut headers, "Name", max_names);
    extend_headers(&mut headers, "Email", max_emails);
    extend_headers(&mut headers, "Address", max_addresses);
    extend_headers(&mut headers, "Phone", max_phones);

    let rows = batch
        .iter()
        .map(|entry| {
            let mut row = Vec::with_capacity(headers.len());
            extend_padded(&mut row, &entry.result.names, max_names);
            extend_padded(&mut row, &entry.result.emails, max_emails);
            extend_padded(&mut row, &entry.result.addresses, max_addresses);
            extend_padded(&mut row, &entry.result.phones, max_phones);
            row
        })
        .collect();

    BatchTable { headers, rows }
}

fn field_max(batch: &[MessageExtraction], len: impl Fn(&mailglean_core::ExtractionResult) -> usize) -> usize {
    batch.iter().map(|entry| len(&entry.result)).max().unwrap_or(0)
}

fn extend_headers(headers: &mut Vec<String>, field: &str, count: usize) {
    for idx in 1..=count {
        headers.push(format!("{field} {idx}"));
    }
}

fn extend_padded(row: &mut Vec<String>, values: &[String], width: usize) {
    row.extend(values.iter().cloned());
    row.extend(std::iter::repeat(String::new()).take(width - values.len()));
}
