use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};

/// A proper rigid-body motion `x -> rotation * (x - from_centroid) + to_centroid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Superposition {
    pub rotation: Matrix3<f64>,
    pub from_centroid: Point3<f64>,
    pub to_centroid: Point3<f64>,
}

impl Superposition {
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.to_centroid + self.rotation * (point - self.from_centroid)
    }

    pub fn apply_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Computes the rotation and translation carrying `moving` onto `target` with minimal RMSD
/// (Kabsch algorithm).
///
/// Points are paired by index. The returned rotation is always proper (determinant +1);
/// a reflection produced by the SVD is corrected by flipping the axis of the smallest
/// singular value.
///
/// Returns `None` if the point sets differ in length, are empty, or the SVD fails.
pub fn kabsch_superposition(
    target: &[Point3<f64>],
    moving: &[Point3<f64>],
) -> Option<Superposition> {
    if target.len() != moving.len() {
        return None;
    }
    let to_centroid = centroid(target)?;
    let from_centroid = centroid(moving)?;

    let mut h = Matrix3::zeros();
    for (p, q) in moving.iter().zip(target.iter()) {
        h += (p - from_centroid) * (q - to_centroid).transpose();
    }

    let svd = h.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return None,
    };

    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        let mut v_t_adj = v_t;
        v_t_adj.row_mut(2).neg_mut();
        rotation = v_t_adj.transpose() * u.transpose();
    }

    Some(Superposition {
        rotation,
        from_centroid,
        to_centroid,
    })
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Finds the atom that moved the most between two index-paired coordinate sets.
pub fn find_max_atom_deviation(
    coords1: &[Point3<f64>],
    coords2: &[Point3<f64>],
) -> Option<(usize, f64)> {
    if coords1.len() != coords2.len() {
        return None;
    }
    coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm())
        .enumerate()
        .max_by(|(_, d1), (_, d2)| d1.partial_cmp(d2).unwrap_or(std::cmp::Ordering::Equal))
}

/// Bending angle `a-b-c` at vertex `b`, in degrees within `[0, 180]`.
///
/// Returns `None` if either arm has zero length.
pub fn bond_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<f64> {
    let ba = a - b;
    let bc = c - b;
    let norms = ba.norm() * bc.norm();
    if norms == 0.0 {
        return None;
    }
    let cos = (ba.dot(&bc) / norms).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Torsion angle `a-b-c-d` about the `b-c` axis, in degrees within `[0, 360)`.
///
/// Positive rotation is clockwise when looking from `b` to `c` (IUPAC). A cis arrangement
/// gives 0 and a trans arrangement 180. Returns `None` for a zero-length central bond.
pub fn dihedral_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<f64> {
    let b0 = a - b;
    let b1 = c - b;
    let b2 = d - c;

    let b1_norm = b1.norm();
    if b1_norm == 0.0 {
        return None;
    }
    let axis = b1 / b1_norm;

    let v = b0 - axis * b0.dot(&axis);
    let w = b2 - axis * b2.dot(&axis);

    let x = v.dot(&w);
    let y = axis.cross(&v).dot(&w);
    let degrees = y.atan2(x).to_degrees();
    Some(if degrees < 0.0 { degrees + 360.0 } else { degrees })
}
