//! The analyzed dataset: optional dense tensor, mode names, class labelings.
//!
//! Class labelings drive the class-separation metrics and the class-colored
//! plots. They are keyed twice: by the mode they label (e.g. the subject
//! mode of an fMRI tensor) and by a labeling name (a dataset may carry
//! several, such as "diagnosis" and "scanner-site").

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use scirs2_core::ndarray_ext::{ArrayD, IxDyn};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed dataset: {0}")]
    Malformed(String),

    #[error("no class labeling {name:?} for mode {mode}")]
    UnknownLabeling { mode: usize, name: String },

    #[error("dataset carries no data tensor")]
    MissingTensor,
}

#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: Vec<usize>,
    data: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DataSetFile {
    #[serde(default)]
    tensor: Option<TensorFile>,
    #[serde(default)]
    mode_names: Vec<String>,
    /// mode index (as string key) -> labeling name -> labels
    #[serde(default)]
    classes: BTreeMap<String, BTreeMap<String, Vec<i64>>>,
}

/// Dataset metadata and (optionally) the raw data tensor itself.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    tensor: Option<ArrayD<f64>>,
    mode_names: Vec<String>,
    classes: BTreeMap<usize, BTreeMap<String, Vec<i64>>>,
}

impl DataSet {
    /// The raw data tensor, when the dataset ships one.
    ///
    /// Metrics that need the tensor (core consistency, recomputed
    /// explained variance) fail with [`DatasetError::MissingTensor`]
    /// when it is absent.
    pub fn tensor(&self) -> Result<&ArrayD<f64>, DatasetError> {
        self.tensor.as_ref().ok_or(DatasetError::MissingTensor)
    }

    pub fn has_tensor(&self) -> bool {
        self.tensor.is_some()
    }

    /// Human-readable name of a mode, if provided.
    pub fn mode_name(&self, mode: usize) -> Option<&str> {
        self.mode_names.get(mode).map(String::as_str)
    }

    /// Class labels for entities along `mode`, under the named labeling.
    pub fn class_labels(&self, mode: usize, name: &str) -> Result<&[i64], DatasetError> {
        self.classes
            .get(&mode)
            .and_then(|labelings| labelings.get(name))
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::UnknownLabeling {
                mode,
                name: name.to_string(),
            })
    }

    /// Names of the labelings available for `mode`.
    pub fn labeling_names(&self, mode: usize) -> Vec<&str> {
        self.classes
            .get(&mode)
            .map(|labelings| labelings.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Load a dataset description from JSON.
pub fn load_dataset(path: &Path) -> Result<DataSet, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DataSetFile = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tensor = match file.tensor {
        Some(t) => {
            let expected: usize = t.shape.iter().product();
            if t.data.len() != expected {
                return Err(DatasetError::Malformed(format!(
                    "tensor data has {} entries but shape {:?} implies {}",
                    t.data.len(),
                    t.shape,
                    expected
                )));
            }
            Some(
                ArrayD::from_shape_vec(IxDyn(&t.shape), t.data)
                    .map_err(|e| DatasetError::Malformed(e.to_string()))?,
            )
        }
        None => None,
    };

    let mut classes = BTreeMap::new();
    for (mode_key, labelings) in file.classes {
        let mode: usize = mode_key.parse().map_err(|_| {
            DatasetError::Malformed(format!("class mode key {:?} is not an index", mode_key))
        })?;
        if let Some(t) = &tensor {
            let mode_size = *t.shape().get(mode).ok_or_else(|| {
                DatasetError::Malformed(format!(
                    "class labeling refers to mode {} of a {}-mode tensor",
                    mode,
                    t.ndim()
                ))
            })?;
            for (name, labels) in &labelings {
                if labels.len() != mode_size {
                    return Err(DatasetError::Malformed(format!(
                        "labeling {:?} for mode {} has {} labels, expected {}",
                        name,
                        mode,
                        labels.len(),
                        mode_size
                    )));
                }
            }
        }
        classes.insert(mode, labelings);
    }

    tracing::debug!(
        path = %path.display(),
        has_tensor = tensor.is_some(),
        n_labeled_modes = classes.len(),
        "loaded dataset"
    );

    Ok(DataSet {
        tensor,
        mode_names: file.mode_names,
        classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_dataset() {
        let file = write_temp(
            r#"{
                "tensor": { "shape": [2, 2, 2], "data": [1, 2, 3, 4, 5, 6, 7, 8] },
                "mode_names": ["subject", "voxel", "time"],
                "classes": { "0": { "diagnosis": [0, 1] } }
            }"#,
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.tensor().unwrap().shape(), &[2, 2, 2]);
        assert_eq!(dataset.mode_name(1), Some("voxel"));
        assert_eq!(dataset.class_labels(0, "diagnosis").unwrap(), &[0, 1]);
        assert_eq!(dataset.labeling_names(0), vec!["diagnosis"]);
    }

    #[test]
    fn test_metadata_only_dataset() {
        let file = write_temp(r#"{ "classes": { "1": { "site": [0, 0, 1] } } }"#);
        let dataset = load_dataset(file.path()).unwrap();

        assert!(!dataset.has_tensor());
        assert!(matches!(
            dataset.tensor().unwrap_err(),
            DatasetError::MissingTensor
        ));
        assert_eq!(dataset.class_labels(1, "site").unwrap(), &[0, 0, 1]);
    }

    #[test]
    fn test_label_count_validated_against_tensor() {
        let file = write_temp(
            r#"{
                "tensor": { "shape": [3, 2], "data": [1, 2, 3, 4, 5, 6] },
                "classes": { "0": { "diagnosis": [0, 1] } }
            }"#,
        );
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed(_)));
    }

    #[test]
    fn test_unknown_labeling() {
        let file = write_temp(r#"{ "classes": { "0": { "diagnosis": [0, 1] } } }"#);
        let dataset = load_dataset(file.path()).unwrap();
        let err = dataset.class_labels(0, "site").unwrap_err();
        assert!(matches!(err, DatasetError::UnknownLabeling { .. }));
    }

    #[test]
    fn test_tensor_size_mismatch() {
        let file = write_temp(r#"{ "tensor": { "shape": [2, 2], "data": [1, 2, 3] } }"#);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed(_)));
    }
}
