use std::path::Path;

use ndarray::{Array3, ArrayView2, Axis};
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiObject};

use crate::error::RenderError;

/// A 3-D volume with just enough affine information to map a world-space
/// axial coordinate to a slice index.
#[derive(Debug, Clone)]
pub struct Volume {
    pub data: Array3<f32>,
    /// World-z per voxel step along the slice axis.
    z_scale: f32,
    /// World-z of slice 0.
    z_offset: f32,
}

impl Volume {
    /// Reads a `.nii` / `.nii.gz` volume. Trailing singleton dimensions
    /// (e.g. a degenerate time axis) are squeezed away.
    pub fn load(path: &Path) -> Result<Volume, RenderError> {
        let object = InMemNiftiObject::from_file(path).map_err(|source| RenderError::Volume {
            path: path.to_path_buf(),
            source,
        })?;
        let header = object.header().clone();
        let data = object
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(|source| RenderError::Volume {
                path: path.to_path_buf(),
                source,
            })?;

        let mut data = data;
        while data.ndim() > 3 && data.shape()[data.ndim() - 1] == 1 {
            let last = data.ndim() - 1;
            data = data.index_axis_move(Axis(last), 0);
        }
        let data = data
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|_| RenderError::NotVolume {
                path: path.to_path_buf(),
            })?;

        // Axial world mapping from the sform when present, otherwise assume
        // the origin sits at the volume center with pixdim spacing.
        let (z_scale, z_offset) = if header.sform_code > 0 && header.srow_z[2].abs() > 1e-6 {
            (header.srow_z[2], header.srow_z[3])
        } else {
            let spacing = if header.pixdim[3].abs() > 1e-6 {
                header.pixdim[3].abs()
            } else {
                1.0
            };
            let nz = data.shape()[2] as f32;
            (spacing, -spacing * nz / 2.0)
        };

        Ok(Volume {
            data,
            z_scale,
            z_offset,
        })
    }

    pub fn from_parts(data: Array3<f32>, z_scale: f32, z_offset: f32) -> Volume {
        Volume {
            data,
            z_scale,
            z_offset,
        }
    }

    pub fn n_slices(&self) -> usize {
        self.data.shape()[2]
    }

    /// Nearest slice to a world-space z coordinate, clamped to the volume.
    pub fn slice_index_for_world_z(&self, world_z: f32) -> usize {
        let k = (world_z - self.z_offset) / self.z_scale;
        let max = (self.n_slices() - 1) as f32;
        k.round().clamp(0.0, max) as usize
    }

    pub fn world_z_of_slice(&self, k: usize) -> f32 {
        self.z_offset + self.z_scale * k as f32
    }

    pub fn axial_slice(&self, k: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(2), k.min(self.n_slices() - 1))
    }

    /// Robust upper intensity bound (98th percentile of positive voxels),
    /// used to normalize anatomical backgrounds.
    pub fn intensity_ceiling(&self) -> f32 {
        let mut values: Vec<f32> = self
            .data
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if values.is_empty() {
            return 1.0;
        }
        values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = ((values.len() - 1) as f32 * 0.98) as usize;
        values[idx].max(f32::EPSILON)
    }
}
