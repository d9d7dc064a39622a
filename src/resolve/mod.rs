//! Post-parse resolution: variants and government inference.
//!
//! Both resolvers need the complete corpus before they can run, so the
//! context accumulates state during parsing and resolves only after the
//! caller signals that every source file has been seen. One context per
//! repository parse; independent contexts never share state, so separate
//! repositories can be processed in isolation.

pub mod species;
pub mod variant;

pub use species::SpeciesTables;
pub use variant::resolve_variants;

use crate::parser::record::Record;
use crate::parser::ship::VariantStub;

/// Accumulator for everything that cannot be resolved mid-parse.
#[derive(Debug, Default)]
pub struct ResolverContext {
    pub species: SpeciesTables,
    pending: Vec<VariantStub>,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all accumulated state. Called at the start of each
    /// repository parse.
    pub fn reset(&mut self) {
        self.species.reset();
        self.pending.clear();
    }

    /// Queue a variant stub for resolution after the parse barrier.
    pub fn defer_variant(&mut self, stub: VariantStub) {
        self.pending.push(stub);
    }

    pub fn pending_variants(&self) -> usize {
        self.pending.len()
    }

    /// Resolve all pending variants against the finished base-ship pool.
    /// Consumes the pending list; calling twice resolves nothing the
    /// second time.
    pub fn resolve_variants(&mut self, ships: &[Record]) -> (Vec<Record>, Vec<String>) {
        let pending = std::mem::take(&mut self.pending);
        variant::resolve_variants(pending, ships)
    }

    /// Attachment pass, run after variant resolution so variant names
    /// exist in their final form.
    pub fn attach_governments(
        &self,
        ships: &mut [Record],
        variants: &mut [Record],
        outfits: &mut [Record],
    ) {
        self.species.attach_governments(ships, variants, outfits);
    }
}
