use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted handle with interior mutability.
///
/// The render thread shares its GPU handles and the buffer registry through these: the
/// engine state, the octree renderer and the mesh renderer each hold a clone.
///
/// # Examples
///
/// ```
/// use octree_voxel_engine::core::StResource;
///
/// let counter = StResource::new(0);
/// let alias = counter.clone();
/// *alias.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Panics
/// Taking [`StResource::get_mut`] while any other guard on the same resource is alive panics.
/// Guards are meant to be short-lived and never held across calls into other systems.
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Wraps `resource` in a fresh shared handle.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Shared access to the contained value.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Exclusive access to the contained value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Number of live handles to this resource.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let resource = StResource::new(vec![1, 2, 3]);
        let clone = resource.clone();
        clone.get_mut().push(4);
        assert_eq!(resource.get().len(), 4);
        assert_eq!(resource.handle_count(), 2);
        drop(clone);
        assert_eq!(resource.handle_count(), 1);
    }
}
