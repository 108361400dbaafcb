pub mod document;
pub mod knowledge_config;
