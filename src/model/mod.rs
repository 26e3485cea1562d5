//! Regression model components: feature scaling and the tree-ensemble
//! regressor

pub mod forest;
pub mod scaler;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeConfig};
