//! Descriptive and interpretive model metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use geotess_geometry::EarthShape;

use crate::ModelError;

/// Storage type of attribute values. Values are held as `f64` and coerced
/// to the declared type's range and precision when stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    Double,
    Float,
    Long,
    Int,
    Short,
    Byte,
}

impl DataType {
    /// Round / truncate `v` to what this type can represent.
    #[must_use]
    pub fn coerce(self, v: f64) -> f64 {
        match self {
            DataType::Double => v,
            DataType::Float => f64::from(v as f32),
            DataType::Long => v.round() as i64 as f64,
            DataType::Int => f64::from(v.round() as i32),
            DataType::Short => f64::from(v.round() as i16),
            DataType::Byte => f64::from(v.round() as i8),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DataType::Double => "DOUBLE",
            DataType::Float => "FLOAT",
            DataType::Long => "LONG",
            DataType::Int => "INT",
            DataType::Short => "SHORT",
            DataType::Byte => "BYTE",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOUBLE" => Ok(DataType::Double),
            "FLOAT" => Ok(DataType::Float),
            "LONG" => Ok(DataType::Long),
            "INT" | "INTEGER" => Ok(DataType::Int),
            "SHORT" => Ok(DataType::Short),
            "BYTE" => Ok(DataType::Byte),
            _ => Err(ModelError::UnknownDataType(s.trim().to_string())),
        }
    }
}

/// Model metadata.
///
/// Layers are ordered from the deepest (index 0) to the shallowest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    pub description: String,
    layer_names: Vec<String>,
    layer_tessellations: Vec<usize>,
    attribute_names: Vec<String>,
    attribute_units: Vec<String>,
    pub data_type: DataType,
    /// Ellipsoid used for depth horizons and geographic output.
    pub earth_shape: EarthShape,
    pub software_version: String,
    pub generation_date: String,
}

impl MetaData {
    /// Metadata with every layer bound to tessellation 0.
    ///
    /// # Errors
    ///
    /// [`ModelError::MetaData`] for an empty layer list, duplicate names, or
    /// attribute names and units of different lengths.
    pub fn new<S: AsRef<str>>(
        layer_names: &[S],
        attribute_names: &[S],
        attribute_units: &[S],
        data_type: DataType,
    ) -> Result<Self, ModelError> {
        let owned = |v: &[S]| v.iter().map(|s| s.as_ref().trim().to_string()).collect::<Vec<_>>();
        let layer_names = owned(layer_names);
        let attribute_names = owned(attribute_names);
        let attribute_units = owned(attribute_units);
        if layer_names.is_empty() {
            return Err(ModelError::MetaData("a model needs at least one layer".into()));
        }
        if attribute_names.len() != attribute_units.len() {
            return Err(ModelError::MetaData(format!(
                "{} attribute names but {} units",
                attribute_names.len(),
                attribute_units.len()
            )));
        }
        for (kind, names) in [("layer", &layer_names), ("attribute", &attribute_names)] {
            if let Some(dup) = names
                .iter()
                .enumerate()
                .find(|&(i, n)| names[..i].contains(n))
                .map(|(_, n)| n)
            {
                return Err(ModelError::MetaData(format!("duplicate {kind} name '{dup}'")));
            }
        }
        Ok(Self {
            description: String::new(),
            layer_tessellations: vec![0; layer_names.len()],
            layer_names,
            attribute_names,
            attribute_units,
            data_type,
            earth_shape: EarthShape::default(),
            software_version: concat!("geotess ", env!("CARGO_PKG_VERSION")).to_string(),
            generation_date: String::new(),
        })
    }

    /// Bind layers to tessellations; one id per layer.
    ///
    /// # Errors
    ///
    /// [`ModelError::MetaData`] when the length differs from the layer count.
    pub fn with_layer_tessellations(mut self, ids: &[usize]) -> Result<Self, ModelError> {
        if ids.len() != self.layer_names.len() {
            return Err(ModelError::MetaData(format!(
                "{} layer tessellation ids for {} layers",
                ids.len(),
                self.layer_names.len()
            )));
        }
        self.layer_tessellations = ids.to_vec();
        Ok(self)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_earth_shape(mut self, shape: EarthShape) -> Self {
        self.earth_shape = shape;
        self
    }

    #[must_use]
    pub fn n_layers(&self) -> usize {
        self.layer_names.len()
    }

    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attribute_names.len()
    }

    #[must_use]
    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    #[must_use]
    pub fn attribute_units(&self) -> &[String] {
        &self.attribute_units
    }

    /// Position of attribute `name`, case-insensitive.
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attribute_names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name.trim()))
    }

    #[must_use]
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layer_names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name.trim()))
    }

    #[must_use]
    pub fn layer_tessellations(&self) -> &[usize] {
        &self.layer_tessellations
    }

    /// Tessellation bound to `layer`, if the layer exists.
    #[must_use]
    pub fn tessellation_of(&self, layer: usize) -> Option<usize> {
        self.layer_tessellations.get(layer).copied()
    }

    /// Layers bound to tessellation `t`, ascending.
    #[must_use]
    pub fn layers_of(&self, t: usize) -> Vec<usize> {
        (0..self.n_layers())
            .filter(|&l| self.layer_tessellations[l] == t)
            .collect()
    }

    /// Equality of everything that affects interpretation of the data:
    /// layer names and tessellation ids, attribute names and units, data type
    /// and earth shape. Description, software version and date are ignored.
    #[must_use]
    pub fn same_interpretation(&self, other: &MetaData) -> bool {
        self.layer_names == other.layer_names
            && self.layer_tessellations == other.layer_tessellations
            && self.attribute_names == other.attribute_names
            && self.attribute_units == other.attribute_units
            && self.data_type == other.data_type
            && self.earth_shape == other.earth_shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> MetaData {
        MetaData::new(
            &["core", "mantle", "crust"],
            &["PSLOWNESS", "SSLOWNESS"],
            &["sec/km", "sec/km"],
            DataType::Float,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_bind_to_tessellation_zero() {
        let md = metadata();
        assert_eq!(md.n_layers(), 3);
        assert_eq!(md.layer_tessellations(), &[0, 0, 0]);
        assert_eq!(md.layers_of(0), vec![0, 1, 2]);
        assert!(md.layers_of(1).is_empty());
    }

    #[test]
    fn test_layer_tessellations() {
        let md = metadata().with_layer_tessellations(&[0, 1, 2]).unwrap();
        assert_eq!(md.tessellation_of(2), Some(2));
        assert_eq!(md.tessellation_of(3), None);
        assert_eq!(md.layers_of(1), vec![1]);
        assert!(metadata().with_layer_tessellations(&[0, 1]).is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let md = metadata();
        assert_eq!(md.attribute_index("sslowness"), Some(1));
        assert_eq!(md.attribute_index("DATA"), None);
        assert_eq!(md.layer_index("Mantle"), Some(1));
    }

    #[test]
    fn test_invalid_metadata() {
        let no_layers: [&str; 0] = [];
        assert!(MetaData::new(&no_layers, &no_layers, &no_layers, DataType::Double).is_err());
        assert!(MetaData::new(&["a"], &["x", "y"], &["u"], DataType::Double).is_err());
        assert!(MetaData::new(&["a", "a"], &["x"], &["u"], DataType::Double).is_err());
    }

    #[test]
    fn test_interpretive_equality_ignores_description() {
        let a = metadata().with_description("first");
        let b = metadata().with_description("second");
        assert_ne!(a, b);
        assert!(a.same_interpretation(&b));
        let c = metadata().with_layer_tessellations(&[0, 0, 1]).unwrap();
        assert!(!a.same_interpretation(&c));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(DataType::Int.coerce(2.6), 3.0);
        assert_eq!(DataType::Byte.coerce(300.0), 127.0);
        assert_eq!(DataType::Float.coerce(0.1), f64::from(0.1f32));
        assert_eq!(DataType::Double.coerce(0.1), 0.1);
    }

    #[test]
    fn test_data_type_parse() {
        assert_eq!("float".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("INTEGER".parse::<DataType>().unwrap(), DataType::Int);
        assert!(matches!("complex".parse::<DataType>(), Err(ModelError::UnknownDataType(_))));
    }
}
