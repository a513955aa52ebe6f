use std::cell::Cell;

use log::debug;
use typed_arena::Arena;

use crate::object::{ObjString, Object};

/// Owner of every heap object created while compiling and running code.
///
/// Objects are only ever released together, when the heap is dropped.
pub struct Heap {
    arena: Arena<Object>,
    objects: Cell<usize>,
    bytes_allocated: Cell<usize>,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            objects: Cell::new(0),
            bytes_allocated: Cell::new(0),
        }
    }

    /// Copies `chars` into a new string object. No interning: equal contents
    /// still get separate allocations.
    pub fn alloc_string(&self, chars: &str) -> &Object {
        self.alloc(Object::String(ObjString::new(chars)))
    }

    fn alloc(&self, object: Object) -> &Object {
        self.objects.set(self.objects.get() + 1);
        self.bytes_allocated
            .set(self.bytes_allocated.get() + object.size());
        self.arena.alloc(object)
    }

    pub fn object_count(&self) -> usize {
        self.objects.get()
    }

    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.get()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        debug!(
            "freeing {} heap objects ({} bytes)",
            self.object_count(),
            self.bytes_allocated()
        );
    }
}
