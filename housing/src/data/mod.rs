//! The housing dataset: typed rows, schema checks, the train/test split and
//! the transformed feature matrices.

mod matrix;
mod record;
mod schema;
mod split;

pub use matrix::{read_matrix, write_matrix, FeatureMatrix};
pub use record::{
    read_headers, read_records, write_records, HousingRecord, CATEGORICAL_COLUMN, COLUMNS,
    NUMERIC_COLUMNS, TARGET_COLUMN,
};
pub use schema::DatasetSchema;
pub use split::{income_category, stratified_split, INCOME_CATEGORY_BOUNDS, SPLIT_SEED, TEST_RATIO};
