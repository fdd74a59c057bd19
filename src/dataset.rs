//! Multi-item container: arrays sharing one time axis and geometry.
//!
//! This is the bundle type for sequence quantiles, time concatenation and
//! file-export delegation; all file-level operations beyond assembling the
//! data live with external collaborators.

use std::fmt;
use std::ops::Index;

use crate::array::DataArray;
use crate::error::FieldError;
use crate::time::TimeAxis;

#[derive(Debug, Clone)]
pub struct Dataset<T = f64> {
    arrays: Vec<DataArray<T>>,
}

impl<T: Clone> Dataset<T> {
    /// Create a dataset; all items must be mutually compatible (shape, time,
    /// dims, geometry)
    pub fn new(arrays: Vec<DataArray<T>>) -> Result<Self, FieldError> {
        let first = arrays
            .first()
            .ok_or_else(|| FieldError::Incompatible("a dataset needs at least one item".to_string()))?;
        for other in &arrays[1..] {
            first.check_compatible(other)?;
        }
        Ok(Self { arrays })
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.arrays.iter().map(|a| a.name()).collect()
    }

    /// Item by name
    pub fn get(&self, name: &str) -> Option<&DataArray<T>> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataArray<T>> {
        self.arrays.iter()
    }

    pub fn time(&self) -> &TimeAxis {
        self.arrays[0].time()
    }

    /// Append a compatible item
    pub fn push(&mut self, array: DataArray<T>) -> Result<(), FieldError> {
        self.arrays[0].check_compatible(&array)?;
        self.arrays.push(array);
        Ok(())
    }
}

impl<T> Index<usize> for Dataset<T> {
    type Output = DataArray<T>;

    fn index(&self, i: usize) -> &DataArray<T> {
        &self.arrays[i]
    }
}

impl Dataset<f64> {
    /// Concatenate datasets along time, item by item; duplicate timestamps
    /// keep the value from the last dataset containing them
    pub fn concat(datasets: &[Dataset<f64>]) -> Result<Dataset<f64>, FieldError> {
        let first = datasets
            .first()
            .ok_or_else(|| FieldError::Incompatible("nothing to concatenate".to_string()))?;
        let n_items = first.len();
        if datasets.iter().any(|ds| ds.len() != n_items) {
            return Err(FieldError::Incompatible(
                "datasets must have the same number of items".to_string(),
            ));
        }
        let mut merged = Vec::with_capacity(n_items);
        for i in 0..n_items {
            let parts: Vec<DataArray<f64>> =
                datasets.iter().map(|ds| ds[i].clone()).collect();
            merged.push(DataArray::concat(&parts)?);
        }
        Dataset::new(merged)
    }

    /// Write the dataset to a NetCDF file (CF-style attributes, one data
    /// variable per item)
    #[cfg(feature = "netcdf")]
    pub fn to_netcdf(&self, path: impl AsRef<std::path::Path>) -> Result<(), FieldError> {
        use crate::array::export::CoordValues;

        let nc_err = |e: netcdf::Error| FieldError::Netcdf(e.to_string());

        let first = &self.arrays[0];
        let coords = first.to_coords();

        let mut file = netcdf::create(path.as_ref()).map_err(nc_err)?;

        for (dim, &size) in coords.dims.iter().zip(coords.shape.iter()) {
            file.add_dimension(dim, size).map_err(nc_err)?;
        }

        file.add_attribute("Conventions", "CF-1.6").map_err(nc_err)?;
        file.add_attribute("source", "hydrofield").map_err(nc_err)?;

        if first.has_time_axis() {
            let mut time_var = file.add_variable::<f64>("time", &["time"]).map_err(nc_err)?;
            time_var
                .put_attribute("units", "seconds since 1970-01-01 00:00:00")
                .map_err(nc_err)?;
            time_var
                .put_attribute("long_name", "time")
                .map_err(nc_err)?;
            time_var
                .put_values(&first.time().as_epoch_seconds(), ..)
                .map_err(nc_err)?;
        }

        for coord in &coords.coords {
            if coord.dim == "time" {
                continue;
            }
            match &coord.values {
                CoordValues::Floats(vals) => {
                    let mut var = file
                        .add_variable::<f64>(&coord.dim, &[&coord.dim])
                        .map_err(nc_err)?;
                    var.put_values(vals, ..).map_err(nc_err)?;
                }
                CoordValues::Ints(vals) => {
                    let mut var = file
                        .add_variable::<i64>(&coord.dim, &[&coord.dim])
                        .map_err(nc_err)?;
                    var.put_values(vals, ..).map_err(nc_err)?;
                }
                CoordValues::Times(_) => {}
            }
        }

        let dim_names: Vec<&str> = coords.dims.iter().map(|d| d.as_str()).collect();
        for array in &self.arrays {
            let name = array.name().replace(' ', "_");
            let mut var = file.add_variable::<f64>(&name, &dim_names).map_err(nc_err)?;
            var.put_attribute("units", array.item().unit.to_string())
                .map_err(nc_err)?;
            var.put_attribute("long_name", array.item().quantity.to_string())
                .map_err(nc_err)?;
            let flat: Vec<f64> = array.values().iter().copied().collect();
            var.put_values(&flat, ..).map_err(nc_err)?;
        }

        Ok(())
    }
}

impl DataArray<f64> {
    /// Wrap into a single-item dataset (all metadata travels with the array)
    pub fn to_dataset(&self) -> Dataset<f64> {
        Dataset {
            arrays: vec![self.clone()],
        }
    }

    /// Write to a NetCDF file via a single-item dataset
    #[cfg(feature = "netcdf")]
    pub fn to_netcdf(&self, path: impl AsRef<std::path::Path>) -> Result<(), FieldError> {
        self.to_dataset().to_netcdf(path)
    }
}

impl<T: Clone> fmt::Display for Dataset<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "<hydrofield.Dataset> ({} items)", self.arrays.len())?;
        for a in &self.arrays {
            writeln!(f, "  {}", a.name())?;
        }
        Ok(())
    }
}
