//! Directory convention and fixed dataset parameters

use std::path::{Path, PathBuf};

/// Headerless CSV served over plain HTTP.
pub const PIMA_URL: &str =
    "https://raw.githubusercontent.com/jbrownlee/Datasets/master/pima-indians-diabetes.data.csv";

pub const PIMA_COLUMNS: [&str; 9] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
    "Outcome",
];

pub const SPLIT_SEED: u64 = 42;

/// Fixed parameters of one dataset flowing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSpec {
    /// Prefix of the processed file names (`{prefix}_X_train.csv`, ...).
    pub prefix: &'static str,
    pub raw_file: &'static str,
    pub label_column: &'static str,
    pub test_fraction: f64,
}

pub const PIMA: DatasetSpec = DatasetSpec {
    prefix: "pima",
    raw_file: "pima-indians-diabetes.csv",
    label_column: "Outcome",
    test_fraction: 0.2,
};

pub const BREAST_CANCER: DatasetSpec = DatasetSpec {
    prefix: "cancer",
    raw_file: "breast_cancer.csv",
    label_column: "target",
    test_fraction: 0.3,
};

/// Project directory layout shared by all stages.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at the current working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("01_raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("02_processed")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.root.join("reports").join("figures")
    }

    pub fn raw_path(&self, spec: &DatasetSpec) -> PathBuf {
        self.raw_dir().join(spec.raw_file)
    }

    /// Path of one of the four processed outputs, e.g. `("pima", "X_train")`.
    pub fn processed_path(&self, spec: &DatasetSpec, part: &str) -> PathBuf {
        processed_file(&self.processed_dir(), spec.prefix, part)
    }
}

pub(crate) fn processed_file(dir: &Path, prefix: &str, part: &str) -> PathBuf {
    dir.join(format!("{prefix}_{part}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/project");
        assert_eq!(
            layout.raw_path(&PIMA),
            PathBuf::from("/project/data/01_raw/pima-indians-diabetes.csv")
        );
        assert_eq!(
            layout.processed_path(&BREAST_CANCER, "y_test"),
            PathBuf::from("/project/data/02_processed/cancer_y_test.csv")
        );
        assert_eq!(layout.figures_dir(), PathBuf::from("/project/reports/figures"));
    }

    #[test]
    fn test_pima_label_is_last_column() {
        assert_eq!(PIMA_COLUMNS.last(), Some(&PIMA.label_column));
    }
}
