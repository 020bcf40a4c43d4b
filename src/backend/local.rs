use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{BackendError, GeometryError, Result};
use crate::geometry::{LineDataset, Polygon};
use crate::host::parse_polyline_feature_set;
use crate::operations::{ClipLines, ClipResult, ComputeDensity, DensityResult, Reproject, WebMercator};

use super::{AnalyticBackend, ScratchStore};

/// Read-only access to the reference seismic-profile dataset.
pub trait LineSource {
    /// Loads the dataset for one invocation.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Dataset` if the dataset cannot be read.
    fn load(&self) -> Result<Cow<'_, LineDataset>>;
}

impl LineSource for LineDataset {
    fn load(&self) -> Result<Cow<'_, LineDataset>> {
        Ok(Cow::Borrowed(self))
    }
}

/// Polyline FeatureSet JSON file, read on every invocation.
#[derive(Debug, Clone)]
pub struct FeatureSetFile {
    path: PathBuf,
}

impl FeatureSetFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FeatureSetFile {
    fn load(&self) -> Result<Cow<'_, LineDataset>> {
        let text = fs::read_to_string(&self.path).map_err(|err| {
            BackendError::Dataset(format!("cannot read {}: {err}", self.path.display()))
        })?;
        let dataset = parse_polyline_feature_set(&text).map_err(|err| {
            BackendError::Dataset(format!("cannot parse {}: {err}", self.path.display()))
        })?;
        debug!(
            path = %self.path.display(),
            lines = dataset.len(),
            wkid = dataset.spatial_reference().wkid(),
            "loaded line dataset"
        );
        Ok(Cow::Owned(dataset))
    }
}

/// Density computed by clipping the reference dataset locally.
///
/// The polygon is brought into the dataset's native reference, the profiles
/// are clipped against it, and length and area are converted from native
/// units to km and km².
pub struct LocalClipBackend<S, P = WebMercator> {
    source: S,
    projection: P,
    scratch: ScratchStore,
}

impl<S: LineSource> LocalClipBackend<S> {
    /// Creates a backend reading profiles from `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_projection(source, WebMercator)
    }
}

impl<S: LineSource, P: Reproject> LocalClipBackend<S, P> {
    /// Creates a backend with a custom reprojection collaborator.
    #[must_use]
    pub fn with_projection(source: S, projection: P) -> Self {
        Self {
            source,
            projection,
            scratch: ScratchStore::new(),
        }
    }

    /// Scratch storage of in-flight clip results.
    #[must_use]
    pub fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }

    /// Measures `polygon` against an explicit dataset.
    ///
    /// # Errors
    ///
    /// - `BackendError::UnsupportedUnit` if the dataset is not in linear units
    /// - `BackendError::UnsupportedSpatialReference` if the polygon cannot be
    ///   reprojected into the dataset's reference
    /// - `GeometryError::InvalidArea` if the polygon area is not positive
    pub fn compute_with(&self, polygon: &Polygon, dataset: &LineDataset) -> Result<DensityResult> {
        let native = dataset.spatial_reference();
        let km = native
            .unit()
            .km_factor()
            .ok_or(BackendError::UnsupportedUnit(native.wkid()))?;

        let polygon = self.projection.reproject_polygon(polygon, native)?;
        let ring = polygon.exterior().ok_or(GeometryError::NoRing)?;

        let lease = self.scratch.insert(ClipLines::new(ring).execute(dataset.lines()));
        let (fragments, length) = lease
            .with(|clip| (clip.fragments().len(), clip.total_length()))
            .unwrap_or_default();

        let length_km = length * km;
        let area_km2 = polygon.area() * km * km;
        info!(
            wkid = native.wkid(),
            fragments,
            length_km,
            area_km2,
            "clipped profiles measured"
        );
        ComputeDensity::new(length_km, area_km2).execute()
    }

    /// Clips `polygon` against the source dataset without measuring.
    ///
    /// # Errors
    ///
    /// Same as [`LocalClipBackend::compute_with`], minus the area check.
    pub fn clip(&self, polygon: &Polygon) -> Result<ClipResult> {
        let dataset = self.source.load()?;
        let polygon = self
            .projection
            .reproject_polygon(polygon, dataset.spatial_reference())?;
        let ring = polygon.exterior().ok_or(GeometryError::NoRing)?;
        Ok(ClipLines::new(ring).execute(dataset.lines()))
    }
}

impl<S: LineSource, P: Reproject> AnalyticBackend for LocalClipBackend<S, P> {
    fn name(&self) -> &'static str {
        "local-clip"
    }

    fn compute(&self, polygon: &Polygon) -> Result<DensityResult> {
        let dataset = self.source.load()?;
        self.compute_with(polygon, &dataset)
    }
}
