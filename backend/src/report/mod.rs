//! Markdown report of a coordinate transformation.
//!
//! Sections, in order:
//!
//! 1. Title with source/target labels
//! 2. General formula
//! 3. Formula with parameters substituted (one block per leg)
//! 4. Worked example for the first point
//! 5. Before/after table, one row per point
//! 6. Mean and standard deviation of X', Y', Z'
//!
//! Formulas are LaTeX in `$$` blocks. The report is output only; nothing
//! parses it back.

pub mod latex;
pub mod stats;

use std::fmt::Write as _;

use crate::error::{ReportError, ReportResult};
use crate::models::{Point, TransformParameters};
use crate::transform::engine::Leg;

pub use stats::{AxisStats, Statistics};

pub const TITLE: &str = "# Coordinate Transformation Report";
pub const GENERAL_FORMULA_HEADING: &str = "## 1. General formula";
pub const SUBSTITUTED_FORMULA_HEADING: &str = "## 2. Formula with parameters substituted";
pub const WORKED_EXAMPLE_HEADING: &str = "## 3. Worked example for the first point";
pub const TABLE_HEADING: &str = "## 4. Points before and after";
pub const STATISTICS_HEADING: &str = "## 5. Statistics (X', Y', Z')";

const TABLE_HEADER: &str = "| Name | X | Y | Z | X' | Y' | Z' |";
const TABLE_RULE: &str = "|---|---|---|---|---|---|---|";

/// Render a single-leg report.
pub fn format_report(
    before: &[Point],
    after: &[Point],
    source: &str,
    target: &str,
    params: &TransformParameters,
) -> ReportResult<String> {
    let legs = [Leg { system: source.to_string(), params: *params }];
    format_route_report(before, after, source, target, &legs)
}

/// Render a report for a route of one or more legs.
///
/// `before[i]` and `after[i]` must describe the same point.
pub fn format_route_report(
    before: &[Point],
    after: &[Point],
    source: &str,
    target: &str,
    legs: &[Leg],
) -> ReportResult<String> {
    if before.is_empty() || after.is_empty() || legs.is_empty() {
        return Err(ReportError::EmptyInput);
    }
    if before.len() != after.len() {
        return Err(ReportError::LengthMismatch {
            before: before.len(),
            after: after.len(),
        });
    }

    let mut out = String::new();
    write_header(&mut out, source, target, legs, before.len());
    write_general_formula(&mut out);
    write_substituted(&mut out, target, legs);
    write_worked_example(&mut out, &before[0], &after[0], target, legs);
    write_table(&mut out, before, after);
    if let Some(stats) = Statistics::from_points(after) {
        write_statistics(&mut out, &stats);
    }
    Ok(out)
}

// `write!` into a String cannot fail.
macro_rules! emit {
    ($out:expr) => { let _ = writeln!($out); };
    ($out:expr, $($arg:tt)*) => { let _ = writeln!($out, $($arg)*); };
}

/// `(from, to)` label of leg `i`.
fn leg_label<'a>(legs: &'a [Leg], i: usize, target: &'a str) -> (&'a str, &'a str) {
    let to = legs.get(i + 1).map(|l| l.system.as_str()).unwrap_or(target);
    (legs[i].system.as_str(), to)
}

fn write_header(out: &mut String, source: &str, target: &str, legs: &[Leg], count: usize) {
    emit!(out, "{}", TITLE);
    emit!(out);
    emit!(out, "**Source system**: {}  ", source);
    emit!(out, "**Target system**: {}  ", target);
    if legs.len() > 1 {
        let mut hops: Vec<&str> = legs.iter().map(|l| l.system.as_str()).collect();
        hops.push(target);
        emit!(out, "**Route**: {}  ", hops.join(" → "));
    }
    emit!(out, "**Points**: {}  ", count);
    emit!(out);
}

fn write_general_formula(out: &mut String) {
    emit!(out, "{}", GENERAL_FORMULA_HEADING);
    emit!(out);
    emit!(out, "$$\n{}\n$$", latex::GENERAL_FORMULA);
    emit!(out);
    emit!(
        out,
        "ΔX, ΔY, ΔZ are translations (m), ωx, ωy, ωz rotations (rad), m the scale difference (ppm × 10⁻⁶)."
    );
    emit!(out);
}

fn write_parameter_line(out: &mut String, params: &TransformParameters) {
    let fields: Vec<String> = params
        .fields()
        .iter()
        .map(|(name, value)| match *name {
            "m" => format!("{} = {} ppm", name, value),
            _ => format!("{} = {}", name, value),
        })
        .collect();
    emit!(out, "{}", fields.join(", "));
    emit!(out);
}

fn write_substituted(out: &mut String, target: &str, legs: &[Leg]) {
    emit!(out, "{}", SUBSTITUTED_FORMULA_HEADING);
    emit!(out);
    for (i, leg) in legs.iter().enumerate() {
        if legs.len() > 1 {
            let (from, to) = leg_label(legs, i, target);
            emit!(out, "### Leg {}: {} → {}", i + 1, from, to);
            emit!(out);
        }
        write_parameter_line(out, &leg.params);
        emit!(out, "$$\n{}\n$$", latex::substituted_formula(&leg.params));
        emit!(out);
    }
}

fn write_worked_example(out: &mut String, first: &Point, result: &Point, target: &str, legs: &[Leg]) {
    emit!(out, "{}", WORKED_EXAMPLE_HEADING);
    emit!(out);
    emit!(out, "Point **{}**", escape_cell(&first.name));
    emit!(out);
    emit!(out, "- Input: ${}$  ", latex::inline_coords(first.coords(), false));

    let mut current = first.coords();
    for (i, leg) in legs.iter().enumerate() {
        if legs.len() > 1 {
            let (from, to) = leg_label(legs, i, target);
            emit!(out, "- Leg {} ({} → {}):  ", i + 1, from, to);
        } else {
            emit!(out, "- Substitution:  ");
        }
        emit!(out, "  $$\n{}\n$$", latex::worked_formula(&leg.params, current));
        current = leg.transform().apply_coords(current);
        if i + 1 < legs.len() {
            emit!(out, "  Intermediate: ${}$  ", latex::inline_coords(current, true));
        }
    }

    emit!(out, "- Result: ${}$", latex::inline_coords(result.coords(), true));
    emit!(out);
}

fn write_table(out: &mut String, before: &[Point], after: &[Point]) {
    emit!(out, "{}", TABLE_HEADING);
    emit!(out);
    emit!(out, "{}", TABLE_HEADER);
    emit!(out, "{}", TABLE_RULE);
    for (b, a) in before.iter().zip(after.iter()) {
        emit!(
            out,
            "|{}|{:.6}|{:.6}|{:.6}|{:.6}|{:.6}|{:.6}|",
            escape_cell(&b.name),
            b.x,
            b.y,
            b.z,
            a.x,
            a.y,
            a.z
        );
    }
    emit!(out);
}

fn write_statistics(out: &mut String, stats: &Statistics) {
    fn fmt_std(std: Option<f64>) -> String {
        std.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "n/a".to_string())
    }

    emit!(out, "{}", STATISTICS_HEADING);
    emit!(out);
    emit!(
        out,
        "- mean: X'={:.3}, Y'={:.3}, Z'={:.3}",
        stats.x.mean,
        stats.y.mean,
        stats.z.mean
    );
    emit!(
        out,
        "- std: X'={}, Y'={}, Z'={}",
        fmt_std(stats.x.std),
        fmt_std(stats.y.std),
        fmt_std(stats.z.std)
    );
}

/// Keep names from breaking the Markdown table.
fn escape_cell(s: &str) -> String {
    s.replace('|', r"\|").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::helmert::HelmertTransform;

    fn points() -> Vec<Point> {
        vec![
            Point::new("Point1", 1000.123, 1500.234, 500.345),
            Point::new("Point2", 2000.456, 2500.567, 1000.678),
            Point::new("Point3", 3000.789, 3500.890, 1500.901),
        ]
    }

    fn translated(points: &[Point], params: &TransformParameters) -> Vec<Point> {
        HelmertTransform::from_parameters(params).apply_all(points)
    }

    fn table_rows(report: &str) -> usize {
        let start = report.find(TABLE_RULE).unwrap() + TABLE_RULE.len();
        report[start..]
            .lines()
            .skip(1)
            .take_while(|l| l.starts_with('|'))
            .count()
    }

    #[test]
    fn test_sections_in_order() {
        let params = TransformParameters::translation(1.0, 2.0, 3.0);
        let before = points();
        let after = translated(&before, &params);
        let report = format_report(&before, &after, "СК-42", "ГСК-2011", &params).unwrap();

        let positions: Vec<usize> = [
            TITLE,
            GENERAL_FORMULA_HEADING,
            SUBSTITUTED_FORMULA_HEADING,
            WORKED_EXAMPLE_HEADING,
            TABLE_HEADING,
            STATISTICS_HEADING,
        ]
        .iter()
        .map(|marker| report.find(marker).unwrap_or_else(|| panic!("missing {}", marker)))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(report.contains("**Source system**: СК-42"));
        assert!(report.contains("**Target system**: ГСК-2011"));
        assert!(!report.contains("**Route**"));
    }

    #[test]
    fn test_one_row_per_point() {
        let params = TransformParameters::translation(1.0, 2.0, 3.0);
        let before = points();
        let after = translated(&before, &params);
        let report = format_report(&before, &after, "A", "B", &params).unwrap();
        assert_eq!(table_rows(&report), before.len());
        assert!(report.contains("|Point1|1000.123000|1500.234000|500.345000|1001.123000|1502.234000|503.345000|"));
    }

    #[test]
    fn test_statistics_three_decimals() {
        let params = TransformParameters::IDENTITY;
        let before = points();
        let report = format_report(&before, &before, "A", "B", &params).unwrap();
        assert!(report.contains("- mean: X'=2000.456, Y'=2500.564, Z'=1000.641"));
        assert!(report.contains("- std: X'=1000.333"));
    }

    #[test]
    fn test_single_point_std_not_available() {
        let params = TransformParameters::translation(1.0, 2.0, 3.0);
        let before = vec![Point::new("P1", 10.0, 20.0, 30.0)];
        let after = translated(&before, &params);
        let report = format_report(&before, &after, "A", "B", &params).unwrap();
        assert!(report.contains("- mean: X'=11.000, Y'=22.000, Z'=33.000"));
        assert!(report.contains("- std: X'=n/a, Y'=n/a, Z'=n/a"));
    }

    #[test]
    fn test_worked_example_uses_first_point() {
        let params = TransformParameters::translation(1.0, 2.0, 3.0);
        let before = vec![Point::new("P1", 10.0, 20.0, 30.0), Point::new("P2", 5.0, 5.0, 5.0)];
        let after = translated(&before, &params);
        let report = format_report(&before, &after, "A", "B", &params).unwrap();

        let example = &report[report.find(WORKED_EXAMPLE_HEADING).unwrap()..report.find(TABLE_HEADING).unwrap()];
        assert!(example.contains("Point **P1**"));
        assert!(example.contains(r"X=10,\;Y=20,\;Z=30"));
        assert!(example.contains(r"X'=11,\;Y'=22,\;Z'=33"));
        assert!(!example.contains("P2"));
    }

    #[test]
    fn test_substituted_parameters() {
        let params = TransformParameters { scale_ppm: -0.228, ..TransformParameters::translation(23.557, -140.844, -79.778) };
        let before = points();
        let after = translated(&before, &params);
        let report = format_report(&before, &after, "A", "B", &params).unwrap();
        assert!(report.contains("ΔX = 23.557"));
        assert!(report.contains("m = -0.228 ppm"));
        assert!(report.contains(r"\begin{bmatrix} 23.557 \\ -140.844 \\ -79.778 \end{bmatrix}"));
    }

    #[test]
    fn test_empty_input() {
        let params = TransformParameters::IDENTITY;
        assert_eq!(format_report(&[], &[], "A", "B", &params).unwrap_err(), ReportError::EmptyInput);
        assert_eq!(
            format_report(&points(), &[], "A", "B", &params).unwrap_err(),
            ReportError::EmptyInput
        );
    }

    #[test]
    fn test_length_mismatch() {
        let params = TransformParameters::IDENTITY;
        let before = points();
        let err = format_report(&before, &before[..1], "A", "B", &params).unwrap_err();
        assert_eq!(err, ReportError::LengthMismatch { before: 3, after: 1 });
    }

    #[test]
    fn test_route_report_lists_legs() {
        let legs = vec![
            Leg { system: "A".into(), params: TransformParameters::translation(1.0, 0.0, 0.0) },
            Leg { system: "B".into(), params: TransformParameters::translation(0.0, 1.0, 0.0) },
        ];
        let before = vec![Point::new("P1", 10.0, 20.0, 30.0)];
        let after = vec![Point::new("P1", 11.0, 21.0, 30.0)];
        let report = format_route_report(&before, &after, "A", "C", &legs).unwrap();

        assert!(report.contains("**Route**: A → B → C"));
        assert!(report.contains("### Leg 1: A → B"));
        assert!(report.contains("### Leg 2: B → C"));
        assert!(report.contains(r"Intermediate: $X'=11,\;Y'=20,\;Z'=30$"));
        assert!(report.contains(r"X'=11,\;Y'=21,\;Z'=30"));
    }

    #[test]
    fn test_pipe_in_name_escaped() {
        let params = TransformParameters::IDENTITY;
        let before = vec![Point::new("a|b", 1.0, 2.0, 3.0)];
        let report = format_report(&before, &before, "A", "B", &params).unwrap();
        assert!(report.contains(r"|a\|b|1.000000|"));
        assert_eq!(table_rows(&report), 1);
    }
}
