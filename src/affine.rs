//! Affine transformations between TrackVis voxmm coordinates and RAS+
//! world coordinates in millimetres.
//!
//! TrackVis stores points in "voxmm" space: millimetres measured from the
//! corner of the first voxel, along the axes named by the header's voxel
//! order. The mapping to RAS+mm follows the convention of the common
//! neuroimaging readers:
//!
//! 1. divide by the voxel size, giving continuous voxel indices;
//! 2. shift by half a voxel, so that integer indices name voxel centres;
//! 3. reorient from the header's voxel order to the orientation implied
//!    by `vox_to_ras`;
//! 4. apply `vox_to_ras`.

use crate::error::{Result, TrkError};
use crate::header::TrkHeader;
use crate::tractogram::Point;
use approx::abs_diff_eq;

/// A 4x4 homogeneous affine, row major.
pub type Affine = [[f32; 4]; 4];

/// An axis orientation: for each input axis, the output axis it maps to
/// and whether it is flipped (`-1.`) or not (`1.`).
pub type Ornt = [(usize, f32); 3];

/// The identity affine.
pub fn identity() -> Affine {
    let mut a = [[0.; 4]; 4];
    for (i, row) in a.iter_mut().enumerate() {
        row[i] = 1.;
    }
    a
}

/// Matrix product `a * b`.
pub fn matmul(a: &Affine, b: &Affine) -> Affine {
    let mut out = [[0.; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Apply an affine to a 3D point.
pub fn apply_affine(a: &Affine, p: Point) -> Point {
    let mut out = [0.; 3];
    for (i, v) in out.iter_mut().enumerate() {
        *v = a[i][0] * p[0] + a[i][1] * p[1] + a[i][2] * p[2] + a[i][3];
    }
    out
}

/// Orientation of axis codes such as "LPS": each letter names the
/// direction towards which its axis increases.
pub fn axcodes_to_ornt(codes: &str) -> Result<Ornt> {
    let invalid = || TrkError::InvalidVoxelOrder(codes.to_string());
    let letters: Vec<char> = codes.chars().collect();
    if letters.len() != 3 {
        return Err(invalid());
    }
    let mut ornt = [(0, 1.); 3];
    let mut seen = [false; 3];
    for (i, c) in letters.into_iter().enumerate() {
        let (axis, flip) = match c.to_ascii_uppercase() {
            'R' => (0, 1.),
            'L' => (0, -1.),
            'A' => (1, 1.),
            'P' => (1, -1.),
            'S' => (2, 1.),
            'I' => (2, -1.),
            _ => return Err(invalid()),
        };
        if seen[axis] {
            return Err(invalid());
        }
        seen[axis] = true;
        ornt[i] = (axis, flip);
    }
    Ok(ornt)
}

/// Orientation implied by the rotation/zoom part of an affine.
///
/// Columns are normalised, then the largest remaining absolute entry
/// repeatedly decides which world axis an input axis maps to.
pub fn affine_to_ornt(a: &Affine) -> Ornt {
    let mut r = [[0f32; 3]; 3];
    for j in 0..3 {
        let norm = (0..3).map(|i| a[i][j] * a[i][j]).sum::<f32>().sqrt();
        let norm = if abs_diff_eq!(norm, 0.) { 1. } else { norm };
        for i in 0..3 {
            r[i][j] = a[i][j] / norm;
        }
    }

    let mut ornt = [(0, 1.); 3];
    let mut used_out = [false; 3];
    let mut used_in = [false; 3];
    for _ in 0..3 {
        let mut best: Option<(usize, usize)> = None;
        for i in (0..3).filter(|&i| !used_out[i]) {
            for j in (0..3).filter(|&j| !used_in[j]) {
                let better = match best {
                    None => true,
                    Some((bi, bj)) => r[i][j].abs() > r[bi][bj].abs(),
                };
                if better {
                    best = Some((i, j));
                }
            }
        }
        if let Some((i, j)) = best {
            used_out[i] = true;
            used_in[j] = true;
            ornt[j] = (i, if r[i][j] < 0. { -1. } else { 1. });
        }
    }
    ornt
}

/// Orientation transform taking data in `start` orientation to `end`
/// orientation.
pub fn ornt_transform(start: &Ornt, end: &Ornt) -> Ornt {
    let mut result = [(0, 1.); 3];
    for (end_in, &(end_out, end_flip)) in end.iter().enumerate() {
        if let Some(start_in) = start.iter().position(|&(out, _)| out == end_out) {
            let flip = if start[start_in].1 == end_flip { 1. } else { -1. };
            result[start_in] = (end_in, flip);
        }
    }
    result
}

/// Affine undoing the reordering and flips of `ornt` on an array of the
/// given shape. Flips are made about the array centre.
pub fn inv_ornt_aff(ornt: &Ornt, shape: [i16; 3]) -> Affine {
    let mut m = [[0.; 4]; 4];
    m[3][3] = 1.;
    for (i, &(axis, flip)) in ornt.iter().enumerate() {
        let centre = -(f32::from(shape[i]) - 1.) / 2.;
        m[i][axis] = flip;
        m[i][3] = flip * centre - centre;
    }
    m
}

/// The affine mapping TrackVis voxmm coordinates to RAS+mm for the given
/// header.
pub fn trackvis_to_rasmm(header: &TrkHeader) -> Result<Affine> {
    let mut vox_to_ras = header.vox_to_ras;
    if abs_diff_eq!(vox_to_ras[3][3], 0.) {
        log::warn!("vox_to_ras is not recorded in the header, assuming identity");
        vox_to_ras = identity();
    }

    let mut scale = identity();
    for (i, &size) in header.voxel_size.iter().enumerate() {
        if abs_diff_eq!(size, 0.) {
            log::warn!("voxel size along axis {} is zero, assuming 1mm", i);
        } else {
            scale[i][i] = 1. / size;
        }
    }

    let mut offset = identity();
    for row in offset.iter_mut().take(3) {
        row[3] = -0.5;
    }

    if header.voxel_order.iter().all(|&b| b == 0 || b == b' ') {
        log::warn!("voxel order is not recorded in the header, assuming LPS");
    }
    let header_ornt = axcodes_to_ornt(&header.voxel_order())?;
    let affine_ornt = affine_to_ornt(&vox_to_ras);
    let reorient = inv_ornt_aff(&ornt_transform(&header_ornt, &affine_ornt), header.dim);

    let affine = matmul(&offset, &scale);
    let affine = matmul(&reorient, &affine);
    Ok(matmul(&vox_to_ras, &affine))
}

/// Convert an affine into an nalgebra matrix.
#[cfg(feature = "nalgebra_affine")]
pub fn to_matrix4(a: &Affine) -> nalgebra::Matrix4<f32> {
    nalgebra::Matrix4::from_fn(|r, c| a[r][c])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_point_eq(got: Point, expected: Point) {
        for (g, e) in got.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*g, *e, epsilon = 1e-5);
        }
    }

    #[test]
    fn axcodes() {
        assert_eq!(
            axcodes_to_ornt("LPS").unwrap(),
            [(0, -1.), (1, -1.), (2, 1.)]
        );
        assert_eq!(
            axcodes_to_ornt("ASR").unwrap(),
            [(1, 1.), (2, 1.), (0, 1.)]
        );
        assert!(axcodes_to_ornt("LRS").is_err());
        assert!(axcodes_to_ornt("LP").is_err());
        assert!(axcodes_to_ornt("XYZ").is_err());
    }

    #[test]
    fn affine_orientation() {
        assert_eq!(affine_to_ornt(&identity()), [(0, 1.), (1, 1.), (2, 1.)]);

        let lps = [
            [-2., 0., 0., 90.],
            [0., -2., 0., 126.],
            [0., 0., 2., -72.],
            [0., 0., 0., 1.],
        ];
        assert_eq!(affine_to_ornt(&lps), [(0, -1.), (1, -1.), (2, 1.)]);

        let swapped = [
            [0., 1., 0., 0.],
            [1., 0., 0., 0.],
            [0., 0., 1., 0.],
            [0., 0., 0., 1.],
        ];
        assert_eq!(affine_to_ornt(&swapped), [(1, 1.), (0, 1.), (2, 1.)]);
    }

    #[test]
    fn transform_between_orientations() {
        let lps = axcodes_to_ornt("LPS").unwrap();
        let ras = axcodes_to_ornt("RAS").unwrap();
        assert_eq!(ornt_transform(&lps, &ras), [(0, -1.), (1, -1.), (2, 1.)]);
        assert_eq!(ornt_transform(&ras, &ras), [(0, 1.), (1, 1.), (2, 1.)]);
    }

    #[test]
    fn ras_header_only_shifts_half_a_voxel() {
        let header = TrkHeader::default();
        let affine = trackvis_to_rasmm(&header).unwrap();
        assert_point_eq(apply_affine(&affine, [1., 2., 3.]), [0.5, 1.5, 2.5]);
    }

    #[test]
    fn voxel_size_scaling() {
        let header = TrkHeader {
            voxel_size: [2., 2., 2.],
            vox_to_ras: [
                [2., 0., 0., 0.],
                [0., 2., 0., 0.],
                [0., 0., 2., 0.],
                [0., 0., 0., 1.],
            ],
            ..TrkHeader::default()
        };
        let affine = trackvis_to_rasmm(&header).unwrap();
        // voxmm (3, 3, 3) is the centre of voxel (1, 1, 1)
        assert_point_eq(apply_affine(&affine, [3., 3., 3.]), [2., 2., 2.]);
    }

    #[test]
    fn lps_header_flips_x_and_y() {
        let header = TrkHeader {
            dim: [10, 10, 10],
            voxel_order: *b"LPS\0",
            ..TrkHeader::default()
        };
        let affine = trackvis_to_rasmm(&header).unwrap();
        assert_point_eq(apply_affine(&affine, [1.5, 1.5, 1.5]), [8., 8., 1.]);
    }

    #[test]
    fn missing_vox_to_ras_is_identity() {
        let header = TrkHeader {
            vox_to_ras: [[0.; 4]; 4],
            ..TrkHeader::default()
        };
        let affine = trackvis_to_rasmm(&header).unwrap();
        assert_point_eq(apply_affine(&affine, [0.5, 0.5, 0.5]), [0., 0., 0.]);
    }

    #[cfg(feature = "nalgebra_affine")]
    #[test]
    fn nalgebra_conversion() {
        let m = to_matrix4(&identity());
        assert_eq!(m, nalgebra::Matrix4::identity());
    }
}
