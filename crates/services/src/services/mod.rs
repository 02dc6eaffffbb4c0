pub mod ai;
pub mod edge_functions;
pub mod llm;
pub mod payments;
pub mod sessions;
pub mod settings;
pub mod whatsapp;
