pub mod error;
pub mod geometry;
pub mod epsilon;
pub mod douglas_peucker;
pub mod chunking;
pub mod parallel;
pub mod stats;
pub mod validation;
pub mod pipeline;
pub mod csv_io;
