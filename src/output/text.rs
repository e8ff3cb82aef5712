//! Human-readable text output

use super::SampleReport;

/// Axes longer than this are elided in the middle
const MAX_AXIS_ITEMS: usize = 8;
/// Items kept at each end of an elided axis
const EDGE_ITEMS: usize = 3;
/// Block means listed before the rest are summarized
const MAX_MEANS: usize = 8;

/// Print sampling results to console
pub fn print_results(report: &SampleReport) {
    print!("{}", render_results(report));
}

/// Render the full report
///
/// Displays:
/// - Operator, context and execution policy
/// - Input, sample and output shapes
/// - The output array, nested by dimension
/// - Per-distribution sample means (when a sample shape is set)
pub fn render_results(report: &SampleReport) -> String {
    let rule = "═══════════════════════════════════════════════════════════";
    let mut out = String::new();
    out.push_str(rule);
    out.push('\n');
    out.push_str("                    SAMPLING RESULTS\n");
    out.push_str(rule);
    out.push_str("\n\n");

    out.push_str(&format!("Operator:     {}\n", report.operator));
    out.push_str(&format!("Inputs:       {}\n", report.input_names.join(", ")));
    out.push_str(&format!("Context:      {}\n", report.context));
    out.push_str(&format!("Execution:    {}\n", report.policy));
    match report.seed {
        Some(seed) => out.push_str(&format!("Seed:         {}\n", seed)),
        None => out.push_str("Seed:         (entropy)\n"),
    }
    out.push('\n');

    out.push_str("Shapes:\n");
    out.push_str(&format!("  Input:  {}\n", format_shape(report.input_shape())));
    out.push_str(&format!("  Sample: {}\n", format_shape(&report.sample_shape)));
    out.push_str(&format!("  Output: {}\n", format_shape(report.output_shape())));
    out.push_str(&format!("  Dtype:  {}\n", report.output.dtype()));
    out.push('\n');

    out.push_str("Samples:\n");
    let values = report.output.to_f64_vec();
    let is_float = report.output.dtype().is_float();
    let rendered = render_nested(report.output_shape(), &values, is_float);
    for line in rendered.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }

    if !report.sample_shape.is_empty() {
        out.push('\n');
        out.push_str("Sample means:\n");
        let means = report.block_means();
        for (i, mean) in means.iter().take(MAX_MEANS).enumerate() {
            out.push_str(&format!("  [{}] {:.4}\n", i, mean));
        }
        if means.len() > MAX_MEANS {
            out.push_str(&format!("  ... {} more\n", means.len() - MAX_MEANS));
        }
    }

    out.push('\n');
    out.push_str(rule);
    out.push('\n');
    out
}

fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("({})", dims.join(", "))
}

fn format_value(v: f64, is_float: bool) -> String {
    if is_float {
        format!("{:.4}", v)
    } else {
        format!("{}", v as i64)
    }
}

/// Bracketed rendering of a row-major array, one innermost row per line
fn render_nested(shape: &[usize], values: &[f64], is_float: bool) -> String {
    match shape.split_first() {
        None => values
            .first()
            .map(|&v| format_value(v, is_float))
            .unwrap_or_default(),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            let items: Vec<String> = visible_indices(len)
                .into_iter()
                .map(|idx| match idx {
                    Some(i) => render_nested(rest, &values[i * stride..(i + 1) * stride], is_float),
                    None => "...".to_string(),
                })
                .collect();
            if rest.is_empty() {
                format!("[{}]", items.join(", "))
            } else {
                let body = items.join(",\n").replace('\n', "\n ");
                format!("[{}]", body)
            }
        }
    }
}

/// Indices shown along an axis; None marks the elided middle
fn visible_indices(len: usize) -> Vec<Option<usize>> {
    if len <= MAX_AXIS_ITEMS {
        return (0..len).map(Some).collect();
    }
    let mut idx: Vec<Option<usize>> = (0..EDGE_ITEMS).map(Some).collect();
    idx.push(None);
    idx.extend((len - EDGE_ITEMS..len).map(Some));
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::report;

    #[test]
    fn test_render_nested_matrix() {
        let s = render_nested(&[2, 2], &[1.0, 2.0, 3.0, 4.0], false);
        assert_eq!(s, "[[1, 2],\n [3, 4]]");
    }

    #[test]
    fn test_render_nested_scalar_and_empty() {
        assert_eq!(render_nested(&[], &[0.5], true), "0.5000");
        assert_eq!(render_nested(&[0], &[], true), "[]");
    }

    #[test]
    fn test_long_axis_is_elided() {
        let values: Vec<f64> = (0..20).map(f64::from).collect();
        let s = render_nested(&[20], &values, false);
        assert_eq!(s, "[0, 1, 2, ..., 17, 18, 19]");
    }

    #[test]
    fn test_render_results_sections() {
        let text = render_results(&report());
        assert!(text.contains("SAMPLING RESULTS"));
        assert!(text.contains("Operator:     sample_uniform"));
        assert!(text.contains("Output: (2, 2)"));
        assert!(text.contains("Dtype:  float32"));
        assert!(text.contains("Seed:         42"));
        assert!(text.contains("[0] 0.5000"));
        assert!(text.contains("[1] 3.2500"));
    }
}
