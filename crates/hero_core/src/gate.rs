/// Latches once the visitor has performed a gesture the browser accepts as
/// permission to start media. Never resets for the lifetime of the page.
#[derive(Debug, Default)]
pub struct InteractionGate {
    interacted: bool,
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    /// Returns `true` only for the call that opened the gate.
    pub fn record_interaction(&mut self) -> bool {
        let first = !self.interacted;
        self.interacted = true;
        first
    }
}
