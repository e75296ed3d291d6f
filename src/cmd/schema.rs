//! Schema command - print expected input formats

use clap::Args;
use ledgerlens::core::{EngineConfig, TransactionBatch};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which input to describe
    #[arg(value_enum, default_value = "input")]
    kind: SchemaKind,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaKind {
    /// JSON Schema for the transaction batch
    Input,
    /// JSON Schema for the engine configuration file
    Config,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = match self.kind {
            SchemaKind::Input => schema_for!(TransactionBatch),
            SchemaKind::Config => schema_for!(EngineConfig),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
