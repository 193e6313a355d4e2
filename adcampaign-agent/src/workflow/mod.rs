mod sequential;

pub use sequential::SequentialPipeline;
