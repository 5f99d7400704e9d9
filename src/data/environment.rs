//! Scope chains.
//!
//! An environment is an arena of frames. Each frame maps symbols to values
//! and links to its parent frame, if any; frame 0 is the global frame.
//!
//! A frame is reachable from the closures created while it was current, and
//! from the frames descending from it. The arena records the highest frame any
//! closure has captured; frames above that are released when the call that
//! created them returns. Captured frames, and every frame below them, live as
//! long as the environment does.

use std::collections::HashMap;

use super::{Sym, Symbols, Value};
use crate::eval::Error;

/// Index of a frame in its environment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

impl FrameId {
    pub const GLOBAL: FrameId = FrameId(0);
}

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<Sym, Value>,
    parent: Option<FrameId>,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct EnvironmentStats {
    pub frames: usize,
    pub bindings: usize,
    pub symbols: usize,
}

/// The scopes of one interpreter session, along with the symbols they use.
///
/// An environment may be handed from one evaluation to the next,
/// so that later evaluations see the definitions of earlier ones.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    /// Frames below this index may be captured by a closure.
    pinned: usize,
    symbols: Symbols,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            // Always reserve the global frame.
            frames: vec![Frame::default()],
            pinned: 1,
            symbols: Symbols::default(),
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> FrameId {
        FrameId::GLOBAL
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut Symbols {
        &mut self.symbols
    }

    pub fn intern(&mut self, name: &str) -> Sym {
        self.symbols.intern(name)
    }

    /// Create a new frame, as a child of the given frame.
    pub fn extend(&mut self, parent: FrameId) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame {
            bindings: HashMap::new(),
            parent: Some(parent),
        });
        id
    }

    /// Record that a closure refers to the frame, so it (and its ancestors) must be kept.
    pub fn capture(&mut self, frame: FrameId) {
        self.pinned = self.pinned.max(frame.0 + 1);
    }

    /// Free `frame` and every frame created after it, unless a closure may refer to them.
    ///
    /// Only valid once the call that created `frame` has returned: any frame created
    /// after it belongs to that call or to calls nested inside it.
    pub fn release(&mut self, frame: FrameId) {
        let keep = frame.0.max(self.pinned);
        if keep < self.frames.len() {
            self.frames.truncate(keep);
        }
    }

    /// The innermost frame, starting from `frame`, that binds the symbol.
    fn resolve(&self, mut frame: FrameId, sym: Sym) -> Option<FrameId> {
        loop {
            let current = &self.frames[frame.0];
            if current.bindings.contains_key(&sym) {
                return Some(frame);
            }
            frame = current.parent?;
        }
    }

    /// Find the value bound to the symbol, searching outward from `frame`.
    pub fn lookup(&self, frame: FrameId, sym: Sym) -> Result<&Value, Error> {
        self.resolve(frame, sym)
            .and_then(|found| self.frames[found.0].bindings.get(&sym))
            .ok_or_else(|| Error::Unbound(self.symbols.resolve(sym).to_owned()))
    }

    /// Bind the symbol in `frame` itself, shadowing any binding in its ancestors.
    pub fn define(&mut self, frame: FrameId, sym: Sym, value: Value) {
        self.frames[frame.0].bindings.insert(sym, value);
    }

    /// Rebind the symbol in the innermost frame, starting from `frame`, that binds it.
    /// Does not create bindings.
    pub fn set(&mut self, frame: FrameId, sym: Sym, value: Value) -> Result<(), Error> {
        let found = self
            .resolve(frame, sym)
            .ok_or_else(|| Error::Unbound(self.symbols.resolve(sym).to_owned()))?;
        self.frames[found.0].bindings.insert(sym, value);
        Ok(())
    }

    /// Whether `frame` itself (not an ancestor) binds the symbol.
    pub fn binds_locally(&self, frame: FrameId, sym: Sym) -> bool {
        self.frames[frame.0].bindings.contains_key(&sym)
    }

    /// Look up a name in the global frame, without interning it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let sym = self.symbols.get(name)?;
        self.lookup(FrameId::GLOBAL, sym).ok()
    }

    /// Canonical textual form of a value from this environment.
    pub fn display(&self, value: &Value) -> String {
        value.display(&self.symbols).to_string()
    }

    pub fn stats(&self) -> EnvironmentStats {
        EnvironmentStats {
            frames: self.frames.len(),
            bindings: self.frames.iter().map(|f| f.bindings.len()).sum(),
            symbols: self.symbols.len(),
        }
    }
}
