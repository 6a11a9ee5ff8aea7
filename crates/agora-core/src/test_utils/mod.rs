//! Test doubles for the inference boundary.

pub mod mock_gemini_server;
pub mod scripted_llm;
