// Resume / job-description analysis.
// Implements: prompt composition, model invocation, response extraction, rendering.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod upload;
