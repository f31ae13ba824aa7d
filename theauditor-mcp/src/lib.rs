//! MCP tool definitions exposing `TheAuditor`'s analysis capabilities, shared
//! between this crate's own stdio server binary and the main CLI's
//! `mcp-server` subcommand.

pub mod tools;
