pub mod knowledge_error;
