pub mod model_based;
pub mod pursuit;
