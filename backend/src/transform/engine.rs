//! Transform engine: route resolution plus Helmert application.
//!
//! Pure and synchronous. Every leg of a route is resolved against the
//! parameter table before any point is touched, so a failure never leaves
//! a partially transformed batch behind.

use std::sync::Arc;

use crate::error::{TransformError, TransformResult};
use crate::models::{Point, TransformParameters};
use crate::parameters::ParameterTable;

use super::helmert::HelmertTransform;
use super::routing::RouteTable;

/// One hop of a resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// System the hop leaves (the parameter key).
    pub system: String,
    pub params: TransformParameters,
}

impl Leg {
    pub fn transform(&self) -> HelmertTransform {
        HelmertTransform::from_parameters(&self.params)
    }
}

/// Parameter table and cascade routes bundled for repeated use.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    table: Arc<ParameterTable>,
    routes: Arc<RouteTable>,
}

impl TransformEngine {
    pub fn new(table: ParameterTable, routes: RouteTable) -> Self {
        Self::shared(Arc::new(table), Arc::new(routes))
    }

    pub fn shared(table: Arc<ParameterTable>, routes: Arc<RouteTable>) -> Self {
        Self { table, routes }
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve `source → target` into its parameter legs.
    pub fn resolve(&self, source: &str, target: &str) -> TransformResult<Vec<Leg>> {
        resolve_legs(source, target, &self.table, &self.routes)
    }

    /// Transform `points` from `source` to `target`.
    pub fn transform(&self, points: &[Point], source: &str, target: &str) -> TransformResult<Vec<Point>> {
        let legs = self.resolve(source, target)?;
        apply_legs(points, &legs)
    }
}

/// Look up every leg of the route for `source → target`.
pub fn resolve_legs(
    source: &str,
    target: &str,
    table: &ParameterTable,
    routes: &RouteTable,
) -> TransformResult<Vec<Leg>> {
    routes
        .resolve(source, target)
        .into_iter()
        .map(|system| {
            table.lookup(system).map(|params| Leg {
                system: system.to_string(),
                params: *params,
            })
        })
        .collect()
}

/// Apply resolved legs in order.
pub fn apply_legs(points: &[Point], legs: &[Leg]) -> TransformResult<Vec<Point>> {
    check_finite(points)?;

    let transforms: Vec<HelmertTransform> = legs.iter().map(Leg::transform).collect();
    Ok(points
        .iter()
        .map(|p| transforms.iter().fold(p.clone(), |acc, t| t.apply(&acc)))
        .collect())
}

/// Transform with the built-in cascade routes.
pub fn transform(
    points: &[Point],
    source: &str,
    target: &str,
    table: &ParameterTable,
) -> TransformResult<Vec<Point>> {
    let legs = resolve_legs(source, target, table, &RouteTable::default())?;
    apply_legs(points, &legs)
}

fn check_finite(points: &[Point]) -> TransformResult<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(TransformError::NonFiniteCoordinate {
            index,
            name: points[index].name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::routing::CascadeRoute;

    const EPS: f64 = 1e-9;

    fn params(dx: f64, dy: f64, dz: f64, wx: f64, wy: f64, wz: f64, m: f64) -> TransformParameters {
        TransformParameters { dx, dy, dz, wx, wy, wz, scale_ppm: m }
    }

    fn abc_table() -> ParameterTable {
        ParameterTable::from_entries([
            ("A", params(1.0, 2.0, 3.0, 1e-6, -2e-6, 3e-6, 0.5)),
            ("B", params(-4.0, 0.5, 7.0, -1e-6, 4e-6, 2e-6, -1.2)),
        ])
    }

    fn abc_engine() -> TransformEngine {
        let routes = RouteTable::new(vec![CascadeRoute::new("A", "C", &["B"])]).unwrap();
        TransformEngine::new(abc_table(), routes)
    }

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new("P1", 2_845_455.012, 2_160_954.573, 5_265_993.081),
            Point::new("P2", 1000.123, 1500.234, 500.345),
            Point::new("P1", -10.0, 0.0, 42.5),
        ]
    }

    fn assert_points_close(a: &[Point], b: &[Point]) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b.iter()) {
            assert_eq!(p.name, q.name);
            for (u, v) in p.coords().iter().zip(q.coords().iter()) {
                assert!((u - v).abs() < EPS, "{} vs {}", u, v);
            }
        }
    }

    #[test]
    fn test_concrete_translation() {
        let table = ParameterTable::from_entries([("A", params(1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0))]);
        let out = transform(&[Point::new("P1", 10.0, 20.0, 30.0)], "A", "B", &table).unwrap();
        assert_points_close(&out, &[Point::new("P1", 11.0, 22.0, 33.0)]);
    }

    #[test]
    fn test_concrete_scale() {
        let table = ParameterTable::from_entries([("A", params(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1_000_000.0))]);
        let out = transform(&[Point::new("P1", 10.0, 20.0, 30.0)], "A", "B", &table).unwrap();
        assert_points_close(&out, &[Point::new("P1", 20.0, 40.0, 60.0)]);
    }

    #[test]
    fn test_order_and_length_preserved() {
        let points = sample_points();
        let out = abc_engine().transform(&points, "A", "B").unwrap();
        assert_eq!(out.len(), points.len());
        for (i, p) in out.iter().enumerate() {
            assert_eq!(p.name, points[i].name);
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert!(abc_engine().transform(&[], "A", "B").unwrap().is_empty());
    }

    #[test]
    fn test_identity_parameters() {
        let table = ParameterTable::from_entries([("I", TransformParameters::IDENTITY)]);
        let points = sample_points();
        let out = transform(&points, "I", "anything", &table).unwrap();
        assert_points_close(&out, &points);
    }

    #[test]
    fn test_cascade_equals_two_steps() {
        let engine = abc_engine();
        let points = sample_points();

        let direct = engine.transform(&points, "A", "C").unwrap();
        let step1 = engine.transform(&points, "A", "B").unwrap();
        let step2 = engine.transform(&step1, "B", "C").unwrap();

        assert_points_close(&direct, &step2);
    }

    #[test]
    fn test_cascade_differs_from_single_hop() {
        let engine = abc_engine();
        let points = sample_points();
        let cascade = engine.transform(&points, "A", "C").unwrap();
        let single = engine.transform(&points, "A", "B").unwrap();
        assert!((cascade[0].x - single[0].x).abs() > 1.0);
    }

    #[test]
    fn test_cascade_with_unknown_leg_fails_whole_call() {
        let table = ParameterTable::from_entries([("A", TransformParameters::IDENTITY)]);
        let routes = RouteTable::new(vec![CascadeRoute::new("A", "C", &["B"])]).unwrap();
        let engine = TransformEngine::new(table, routes);

        let err = engine.transform(&sample_points(), "A", "C").unwrap_err();
        assert_eq!(err, TransformError::UnknownSystem { system: "B".into() });
    }

    #[test]
    fn test_unknown_system() {
        let err = abc_engine()
            .transform(&sample_points(), "NoSuchSystem", "C")
            .unwrap_err();
        assert_eq!(err, TransformError::UnknownSystem { system: "NoSuchSystem".into() });
    }

    #[test]
    fn test_target_does_not_select_parameters() {
        let engine = abc_engine();
        let points = sample_points();
        let to_b = engine.transform(&points, "A", "B").unwrap();
        let to_x = engine.transform(&points, "A", "X").unwrap();
        assert_points_close(&to_b, &to_x);
    }

    #[test]
    fn test_non_finite_rejected() {
        let points = vec![Point::new("ok", 1.0, 1.0, 1.0), Point::new("nan", 1.0, f64::NAN, 1.0)];
        let err = abc_engine().transform(&points, "A", "B").unwrap_err();
        assert_eq!(err, TransformError::NonFiniteCoordinate { index: 1, name: "nan".into() });
    }

    #[test]
    fn test_resolve_legs() {
        let legs = abc_engine().resolve("A", "C").unwrap();
        let systems: Vec<&str> = legs.iter().map(|l| l.system.as_str()).collect();
        assert_eq!(systems, vec!["A", "B"]);
        assert_eq!(legs[1].params.dx, -4.0);
    }

    #[test]
    fn test_embedded_sk42_to_wgs84_cascade() {
        let table = ParameterTable::embedded().unwrap();
        let points = vec![Point::new("P", 2_845_455.0, 2_160_954.0, 5_265_993.0)];

        let cascade = transform(&points, "СК-42", "WGS-84", &table).unwrap();
        let via = transform(&points, "СК-42", "ПЗ-90.11", &table).unwrap();
        let last = transform(&via, "ПЗ-90.11", "WGS-84", &table).unwrap();
        assert_points_close(&cascade, &last);

        // СК-42 offsets are tens to hundreds of meters
        assert!((cascade[0].y - points[0].y).abs() > 100.0);
    }
}
