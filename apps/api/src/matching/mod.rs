// The matching pipeline: extraction fan-out, batching, model scoring, merging.
// All model calls go through the gemini module — no direct API calls here.

pub mod batch;
pub mod handlers;
pub mod model;
pub mod pipeline;
pub mod prompts;
