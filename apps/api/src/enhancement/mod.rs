// Enhancement: prompt the completion service for an improved resume, decode it,
// then hand the decoded document to grounding and rendering.

pub mod decoder;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
