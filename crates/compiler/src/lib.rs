//! Backend front door
//!
//! Reads a [`CompilerConfig`], selects the translation strategy once and
//! hands back a finished [`ram::Program`], or the first error with nothing
//! else.
//!
//! ```
//! use compiler::Compiler;
//! use ast2ram::TranslationStrategy;
//! use datalog_ast::Program;
//!
//! let compiled = Compiler::new()
//!     .with_strategy(TranslationStrategy::Provenance)
//!     .with_debug_info(false)
//!     .compile(&Program::new())
//!     .unwrap();
//! assert!(compiled.relations.is_empty());
//! ```

pub mod config;
pub mod error;

pub use config::CompilerConfig;
pub use error::CompileError;

use ast2ram::{translate_unit, TranslationStrategy, TranslatorContext};
use datalog_ast::Program;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: TranslationStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_debug_info(mut self, emit: bool) -> Self {
        self.config.emit_debug_info = emit;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, program: &Program) -> Result<ram::Program, CompileError> {
        debug!(
            relations = program.relations.len(),
            clauses = program.clauses.len(),
            "compiling program"
        );
        let ctx = TranslatorContext::new(program, self.config.strategy)?
            .with_debug_info(self.config.emit_debug_info);
        let compiled = translate_unit(&ctx)?;
        info!(
            strategy = self.config.strategy.name(),
            relations = compiled.relations.len(),
            subroutines = compiled.subroutines.len(),
            "compiled program"
        );
        Ok(compiled)
    }
}
