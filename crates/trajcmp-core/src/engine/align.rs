use super::error::ComparisonError;
use crate::core::models::structure::MolecularStructure;
use crate::core::utils::geometry;

/// Superimposes `moving` onto `target` and returns the moved copy.
///
/// The rigid motion minimizes the positional RMSD between index-paired atoms. Atomic numbers
/// and metadata of `moving` are carried over unchanged; neither input is modified.
///
/// # Errors
///
/// Returns [`ComparisonError::ShapeMismatch`] if the atom counts differ.
pub fn align(
    target: &MolecularStructure,
    moving: &MolecularStructure,
) -> Result<MolecularStructure, ComparisonError> {
    if target.len() != moving.len() {
        return Err(ComparisonError::ShapeMismatch {
            expected: target.len(),
            found: moving.len(),
        });
    }
    if moving.is_empty() {
        return Ok(moving.clone());
    }

    let fit = geometry::kabsch_superposition(target.positions(), moving.positions())
        .ok_or_else(|| ComparisonError::Alignment("SVD did not converge".to_string()))?;
    moving
        .with_positions(fit.apply_all(moving.positions()))
        .map_err(|e| ComparisonError::Alignment(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::StructureInfo;
    use crate::core::utils::geometry::{calculate_rmsd, rotation_from_axis_angle};
    use nalgebra::{Point3, Vector3};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn random_structure(rng: &mut StdRng, n: usize) -> MolecularStructure {
        let coords: Vec<[f64; 3]> = (0..n)
            .map(|_| {
                [
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                ]
            })
            .collect();
        MolecularStructure::from_coords(vec![6; n], &coords).unwrap()
    }

    fn random_rigid_motion(rng: &mut StdRng, s: &MolecularStructure) -> MolecularStructure {
        let axis = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(0.1..1.0),
        );
        let rot = rotation_from_axis_angle(&axis, rng.gen_range(0.0..360.0));
        let shift = Vector3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );
        let positions = s.positions().iter().map(|p| rot * p + shift).collect();
        s.with_positions(positions).unwrap()
    }

    #[test]
    fn aligned_copy_keeps_identity_and_metadata() {
        let target = MolecularStructure::from_coords(
            vec![6, 6, 8],
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        let moving = MolecularStructure::from_coords(
            vec![6, 6, 8],
            &[[5.0, 5.0, 5.0], [5.0, 6.0, 5.0], [4.0, 5.0, 5.0]],
        )
        .unwrap()
        .with_info(StructureInfo::new("conf_2", "rotated", "confs.xyz"));

        let aligned = align(&target, &moving).unwrap();

        assert_eq!(aligned.atomic_numbers(), moving.atomic_numbers());
        assert_eq!(aligned.info(), moving.info());
        assert_eq!(moving.positions()[0], Point3::new(5.0, 5.0, 5.0));
        assert!(calculate_rmsd(aligned.positions(), target.positions()).unwrap() < 1e-9);
    }

    #[test]
    fn atom_count_mismatch_is_a_shape_error() {
        let a = MolecularStructure::from_coords(vec![1, 1], &[[0.0; 3], [1.0, 0.0, 0.0]]).unwrap();
        let b = MolecularStructure::from_coords(vec![1], &[[0.0; 3]]).unwrap();
        assert_eq!(
            align(&a, &b),
            Err(ComparisonError::ShapeMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn empty_structures_align_trivially() {
        let empty = MolecularStructure::from_coords(vec![], &[]).unwrap();
        assert_eq!(align(&empty, &empty).unwrap(), empty);
    }

    #[test]
    fn alignment_never_increases_positional_rmsd() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..25 {
            let target = random_structure(&mut rng, 8);
            let moving = random_structure(&mut rng, 8);
            let before = calculate_rmsd(moving.positions(), target.positions()).unwrap();
            let aligned = align(&target, &moving).unwrap();
            let after = calculate_rmsd(aligned.positions(), target.positions()).unwrap();
            assert!(after <= before + 1e-12, "{after} > {before}");
        }
    }

    #[test]
    fn alignment_undoes_random_rigid_motions() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..25 {
            let target = random_structure(&mut rng, 10);
            let moved = random_rigid_motion(&mut rng, &target);
            let aligned = align(&target, &moved).unwrap();
            let rmsd = calculate_rmsd(aligned.positions(), target.positions()).unwrap();
            assert!(rmsd < 1e-8, "residual rmsd {rmsd}");
        }
    }
}
