//! These models represent the objects passed around by the agent
//!
//! There are two formats we need to interact with:
//! - openai chat completion messages/tools, sent from the agent to the LLM
//! - the plain role/content transcript kept by the presentation layer
//!
//! We always immediately convert those data models into the internal structs using
//! to/from helpers. Because tool requests and results have to be paired by id, the
//! internal models keep more structure than either format.
pub mod message;
pub mod role;
pub mod tool;
