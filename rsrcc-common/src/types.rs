//! Shared compiler types

/// Raw label number handed out by [`LabelGenerator`]
pub type LabelId = u32;

/// Prefix of labels naming global storage words
pub const GLOBAL_PREFIX: &str = "GL";
/// Prefix of labels naming jump targets
pub const BRANCH_PREFIX: &str = "L";
/// Prefix of labels naming function entry points
pub const FUNCTION_PREFIX: &str = "FN";

/// Label generator for code generation.
///
/// One generator lives for exactly one compilation, so every label it hands
/// out is unique within that compilation regardless of prefix.
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    next_id: LabelId,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }
    
    /// Take the next label number
    pub fn next_id(&mut self) -> LabelId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
    
    /// Generate a new unique jump-target label
    pub fn new_label(&mut self) -> String {
        self.new_label_with_prefix(BRANCH_PREFIX)
    }
    
    /// Generate a new label with a prefix
    pub fn new_label_with_prefix(&mut self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id())
    }
}
