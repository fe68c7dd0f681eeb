// LLM providers — trait-based abstraction for swappable chat backends.
//
// The ChatProvider trait defines the interface. OpenAiCompatibleClient
// implements it for any `/chat/completions` endpoint, which covers both the
// OpenAI and the NVIDIA hosted backends. Tests substitute scripted stubs.

pub mod openai;
pub mod traits;
