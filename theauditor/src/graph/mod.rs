//! Cross-file graph structures: the global symbol table and (via [`symbols`])
//! the import/call edge representation consumed by the semantic analyzer,
//! the taint tracker's call graph, and the FCE's context-bundle assembly.

/// Global Symbol Table mapping Fully Qualified Names to their definitions.
pub mod symbols;
