use std::sync::Arc;

use super::active::ActiveContext;

/// A saved stack depth. Reverting to it drops every frame pushed since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "the stack must be reverted once the subtree is finished"]
pub struct Checkpoint(usize);

#[derive(Clone, Debug)]
struct Frame {
    context: Arc<ActiveContext>,
    propagate: bool,
}

/// The stack of active contexts, one frame per document level that introduced new context.
///
/// Frames are only ever pushed, or cut back to a checkpoint. This mirrors the recursion over the
/// document: a node takes a checkpoint before resolving its contexts and reverts to it when its
/// subtree is done.
#[derive(Clone, Debug)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    /// Create a stack holding a single empty frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                context: Arc::new(ActiveContext::default()),
                propagate: true,
            }],
        }
    }

    /// The frame currently in effect.
    pub fn top(&self) -> &Arc<ActiveContext> {
        // The root frame is never removed
        &self.frames[self.frames.len() - 1].context
    }

    /// Whether the top frame carries over into child nodes.
    pub fn top_propagates(&self) -> bool {
        self.frames[self.frames.len() - 1].propagate
    }

    /// The nearest frame that carries over into child nodes.
    pub fn propagating_top(&self) -> &Arc<ActiveContext> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.propagate)
            .map(|f| &f.context)
            .unwrap_or_else(|| &self.frames[0].context)
    }

    pub fn push(&mut self, context: Arc<ActiveContext>, propagate: bool) {
        self.frames.push(Frame { context, propagate });
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.frames.len())
    }

    /// Drop every frame pushed since the checkpoint was taken.
    pub fn revert(&mut self, checkpoint: Checkpoint) {
        self.frames.truncate(checkpoint.0.max(1));
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}
