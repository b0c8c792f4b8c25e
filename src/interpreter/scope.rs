use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use lachs::Span;

use super::value::Value;

/// One lexical frame: a trace label for diagnostics, the bindings, and a
/// parent link.
struct Frame {
    trace: String,
    entries: HashMap<String, Value>,
    parent: Option<Rc<RefCell<Frame>>>,
}

/// Shared handle to a frame chain.
///
/// Cloning a `Scope` is cheap and aliases the same bindings; function
/// values keep their captured frame alive this way. Chains may be cyclic
/// (a function stored in its own captured frame) - frames are simply
/// released with the interpreter run, never torn down eagerly.
#[derive(Clone)]
pub struct Scope {
    filename: Rc<str>,
    frame: Rc<RefCell<Frame>>,
}

impl Scope {
    /// The root frame of a program run. Runtime natives are injected here.
    pub fn root(filename: &str) -> Self {
        Self {
            filename: Rc::from(filename),
            frame: Rc::new(RefCell::new(Frame {
                trace: String::new(),
                entries: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// A child frame whose lookups fall through to this one.
    pub fn child(&self, trace: String) -> Self {
        Self {
            filename: self.filename.clone(),
            frame: Rc::new(RefCell::new(Frame {
                trace,
                entries: HashMap::new(),
                parent: Some(self.frame.clone()),
            })),
        }
    }

    /// Look a name up, walking from this frame to the root.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = self.frame.clone();
        loop {
            if let Some(value) = current.borrow().entries.get(name) {
                return Some(value.clone());
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Assign a name: overwrite the existing binding wherever it lives in
    /// the chain, or create one in this frame if the name is unbound.
    pub fn set(&self, name: &str, value: Value) {
        let mut current = self.frame.clone();
        loop {
            if current.borrow().entries.contains_key(name) {
                current.borrow_mut().entries.insert(name.to_string(), value);
                return;
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        self.frame
            .borrow_mut()
            .entries
            .insert(name.to_string(), value);
    }

    /// Bind a name in this frame unconditionally, shadowing any binding
    /// higher up. Used for `let` and for parameter binding.
    pub fn declare(&self, name: &str, value: Value) {
        self.frame
            .borrow_mut()
            .entries
            .insert(name.to_string(), value);
    }

    /// Snapshot of this frame's own bindings (parents excluded), in no
    /// particular order. `import` materializes a module's root frame from
    /// this.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.frame
            .borrow()
            .entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Format a source span as `filename:line:column`.
    pub fn site(&self, span: &Span) -> String {
        format!(
            "{}:{}:{}",
            self.filename,
            span.start.0 + 1,
            span.start.1 + 1
        )
    }

    /// The trace labels from this frame up to the root, one per line.
    pub fn trace(&self) -> String {
        let mut labels = Vec::new();
        let mut current = self.frame.clone();
        loop {
            let frame = current.borrow();
            if !frame.trace.is_empty() {
                labels.push(frame.trace.clone());
            }
            let parent = frame.parent.clone();
            drop(frame);
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        labels.join("\n")
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Frame chains can be cyclic through captured functions, so only
        // the label is printed.
        f.debug_struct("Scope")
            .field("trace", &self.frame.borrow().trace)
            .finish()
    }
}
