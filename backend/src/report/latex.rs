//! LaTeX fragments for the formula sections.

use crate::models::TransformParameters;
use crate::transform::helmert::rotation_matrix;

/// The symbolic Helmert formula.
pub const GENERAL_FORMULA: &str = concat!(
    r"\begin{bmatrix} X' \\ Y' \\ Z' \end{bmatrix} = (1 + m) ",
    r"\begin{bmatrix} 1 & \omega_z & -\omega_y \\ -\omega_z & 1 & \omega_x \\ \omega_y & -\omega_x & 1 \end{bmatrix} ",
    r"\begin{bmatrix} X \\ Y \\ Z \end{bmatrix} + ",
    r"\begin{bmatrix} \Delta X \\ \Delta Y \\ \Delta Z \end{bmatrix}",
);

/// Render a number for math display.
///
/// Magnitudes below 1e-3 or at/above 1e7 use `a \cdot 10^{b}`.
pub fn number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let a = v.abs();
    if a < 1e-3 || a >= 1e7 {
        let s = format!("{:e}", v);
        match s.split_once('e') {
            Some((mantissa, exp)) => format!(r"{} \cdot 10^{{{}}}", mantissa, exp),
            None => s,
        }
    } else {
        format!("{}", v)
    }
}

/// `(1 + m)` / `(1 - |m|)` with the dimensionless scale difference.
pub fn scale_term(params: &TransformParameters) -> String {
    let m = params.scale_delta();
    if m < 0.0 {
        format!("(1 - {})", number(-m))
    } else {
        format!("(1 + {})", number(m))
    }
}

fn column(values: [f64; 3]) -> String {
    format!(
        r"\begin{{bmatrix}} {} \\ {} \\ {} \end{{bmatrix}}",
        number(values[0]),
        number(values[1]),
        number(values[2])
    )
}

fn rotation(params: &TransformParameters) -> String {
    let rows: Vec<String> = rotation_matrix(params.wx, params.wy, params.wz)
        .iter()
        .map(|row| row.iter().map(|v| number(*v)).collect::<Vec<_>>().join(" & "))
        .collect();
    format!(r"\begin{{bmatrix}} {} \end{{bmatrix}}", rows.join(r" \\ "))
}

/// The formula with parameters substituted and the input left symbolic.
pub fn substituted_formula(params: &TransformParameters) -> String {
    format!(
        r"\begin{{bmatrix}} X' \\ Y' \\ Z' \end{{bmatrix}} = {} {} \begin{{bmatrix}} X \\ Y \\ Z \end{{bmatrix}} + {}",
        scale_term(params),
        rotation(params),
        column(params.translation_vector())
    )
}

/// The formula with both parameters and input coordinates substituted.
pub fn worked_formula(params: &TransformParameters, input: [f64; 3]) -> String {
    format!(
        "{} {} {} + {}",
        scale_term(params),
        rotation(params),
        column(input),
        column(params.translation_vector())
    )
}

/// Inline `X=..,\;Y=..,\;Z=..` with optional primes.
pub fn inline_coords(values: [f64; 3], primed: bool) -> String {
    let mark = if primed { "'" } else { "" };
    format!(
        r"X{m}={},\;Y{m}={},\;Z{m}={}",
        values[0],
        values[1],
        values[2],
        m = mark
    )
}
