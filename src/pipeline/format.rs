/// Space-separated decimal rendering of a feature vector
///
/// Each value is the shortest decimal that reads back as the same `f32`,
/// never in exponent notation. Infinities print as `+Inf`/`-Inf`.
pub fn floats_to_line(data: &[f32]) -> String {
    let mut line = String::with_capacity(data.len() * 8);
    for (i, &x) in data.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        if x == f32::INFINITY {
            line.push_str("+Inf");
        } else if x == f32::NEG_INFINITY {
            line.push_str("-Inf");
        } else {
            line.push_str(&x.to_string());
        }
    }
    line
}

/// `1`/`0` per class, space-separated
pub fn classes_to_line(present: &[bool]) -> String {
    present
        .iter()
        .map(|&p| if p { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Feature line and class line of one example, without the trailing newline
pub fn format_record(features: &[f32], classes: &[bool]) -> String {
    let mut record = floats_to_line(features);
    record.push('\n');
    record.push_str(&classes_to_line(classes));
    record
}
